use bytes::Bytes;
use opaldb::core::commands::command_trait::{ExecutableCommand, ParseCommand};
use opaldb::core::commands::hash::{HGet, HGetAll, HSet};
use opaldb::core::protocol::RespFrame;
use opaldb::core::storage::{Db, ExecutionContext};
use opaldb::core::{OpalDBError, RespValue};

fn bulk(s: &'static str) -> RespFrame {
    RespFrame::BulkString(Bytes::from_static(s.as_bytes()))
}

#[tokio::test]
async fn test_hset_stores_and_hget_reads_back() {
    let db = Db::new();
    let mut ctx = ExecutionContext { db: &db };

    let hset = HSet::parse(&[bulk("users"), bulk("u1"), bulk("alice")]).unwrap();
    let result = hset.execute(&mut ctx).await.unwrap();
    assert_eq!(result, RespValue::SimpleString("OK".to_string()));

    let hget = HGet::parse(&[bulk("users"), bulk("u1")]).unwrap();
    let result = hget.execute(&mut ctx).await.unwrap();
    assert_eq!(result, RespValue::BulkString(Bytes::from_static(b"alice")));
}

#[tokio::test]
async fn test_hget_missing_field_returns_null() {
    let db = Db::new();
    db.hset(
        Bytes::from_static(b"users"),
        Bytes::from_static(b"u1"),
        Bytes::from_static(b"alice"),
    );
    let mut ctx = ExecutionContext { db: &db };

    let hget = HGet::parse(&[bulk("users"), bulk("u2")]).unwrap();
    assert_eq!(hget.execute(&mut ctx).await.unwrap(), RespValue::Null);

    let hget = HGet::parse(&[bulk("ghosts"), bulk("u1")]).unwrap();
    assert_eq!(hget.execute(&mut ctx).await.unwrap(), RespValue::Null);
}

#[tokio::test]
async fn test_hgetall_returns_flat_pairs_in_insertion_order() {
    let db = Db::new();
    let mut ctx = ExecutionContext { db: &db };

    for (field, value) in [("u1", "alice"), ("u2", "bob"), ("u3", "carol")] {
        let hset = HSet::parse(&[
            bulk("users"),
            RespFrame::BulkString(Bytes::from(field)),
            RespFrame::BulkString(Bytes::from(value)),
        ])
        .unwrap();
        hset.execute(&mut ctx).await.unwrap();
    }

    let hgetall = HGetAll::parse(&[bulk("users")]).unwrap();
    let result = hgetall.execute(&mut ctx).await.unwrap();
    assert_eq!(
        result,
        RespValue::Array(vec![
            RespValue::BulkString(Bytes::from_static(b"u1")),
            RespValue::BulkString(Bytes::from_static(b"alice")),
            RespValue::BulkString(Bytes::from_static(b"u2")),
            RespValue::BulkString(Bytes::from_static(b"bob")),
            RespValue::BulkString(Bytes::from_static(b"u3")),
            RespValue::BulkString(Bytes::from_static(b"carol")),
        ])
    );
}

#[tokio::test]
async fn test_hgetall_missing_key_returns_empty_array() {
    let db = Db::new();
    let mut ctx = ExecutionContext { db: &db };

    let hgetall = HGetAll::parse(&[bulk("nope")]).unwrap();
    assert_eq!(
        hgetall.execute(&mut ctx).await.unwrap(),
        RespValue::Array(vec![])
    );
}

#[test]
fn test_hash_commands_check_arity() {
    assert!(matches!(
        HSet::parse(&[bulk("users"), bulk("u1")]).unwrap_err(),
        OpalDBError::WrongArgumentCount(_)
    ));
    assert!(matches!(
        HGet::parse(&[bulk("users")]).unwrap_err(),
        OpalDBError::WrongArgumentCount(_)
    ));
    assert!(matches!(
        HGetAll::parse(&[]).unwrap_err(),
        OpalDBError::WrongArgumentCount(_)
    ));
}
