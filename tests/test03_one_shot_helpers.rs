use db2i_pool::prelude::*;
use db2i_pool::test_utils::{FakeCall, create_test_rows, fake_pool};

const CUSTOMERS: &str = "SELECT CUSNUM, LSTNAM FROM QIWS.QCUSTCDT";
const CUSTOMERS_BY_STATE: &str = "SELECT CUSNUM, LSTNAM FROM QIWS.QCUSTCDT WHERE STATE = ?";

fn customer_rows() -> Vec<DbRow> {
    create_test_rows(
        &["CUSNUM", "LSTNAM"],
        vec![
            vec![RowValues::Int(938_472), RowValues::Text("Henning".into())],
            vec![RowValues::Int(839_283), RowValues::Text("Jones".into())],
        ],
    )
}

#[tokio::test(flavor = "current_thread")]
async fn run_sql_without_rows_returns_none() -> Result<(), Db2PoolError> {
    let (_driver, pool) = fake_pool(2).await?;

    let result = pool.run_sql("SELECT 1 FROM X WHERE 1=0").await?;

    assert!(result.is_none());
    assert_eq!(pool.available_count(), 2);
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn run_sql_returns_rows_and_releases_connection() -> Result<(), Db2PoolError> {
    let (driver, pool) = fake_pool(2).await?;
    driver.set_result(CUSTOMERS, Ok(customer_rows()));

    let rows = pool.run_sql(CUSTOMERS).await?.expect("rows");

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].get("LSTNAM"), Some(&RowValues::Text("Jones".into())));
    assert_eq!(pool.available_count(), 2);
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn run_sql_failure_retires_connection() -> Result<(), Db2PoolError> {
    let (driver, pool) = fake_pool(2).await?;
    driver.set_result(
        "DROP TABLE NOPE",
        Err(DriverError::new("NOPE in *LIBL not found").with_sqlstate("42704")),
    );

    let result = pool.run_sql("DROP TABLE NOPE").await?;

    assert!(result.is_none());
    assert_eq!(pool.len(), 1, "failed statement retires its connection");
    assert!(driver.calls().contains(&FakeCall::Close { conn: 0 }));
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn run_sql_retires_when_detach_fails() -> Result<(), Db2PoolError> {
    let (driver, pool) = fake_pool(2).await?;
    driver.set_result(CUSTOMERS, Ok(customer_rows()));
    driver.fail_statement_close(true);

    let rows = pool.run_sql(CUSTOMERS).await?;

    assert_eq!(rows.map(|r| r.len()), Some(2));
    assert_eq!(pool.len(), 1);
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn prepare_execute_insert_returns_none_and_frees_slot() -> Result<(), Db2PoolError> {
    let (driver, pool) = fake_pool(2).await?;

    let result = pool
        .prepare_execute("INSERT INTO T VALUES (?)", &[ParamValue::from(42)])
        .await?;

    assert!(result.is_none());
    assert_eq!(pool.len(), 2);
    assert_eq!(pool.available_count(), 2);
    assert!(driver.calls().contains(&FakeCall::Bind {
        stmt: 0,
        params: vec![BindParam {
            value: ParamValue::Integer(42),
            direction: BindDirection::InOut,
            bind_type: BindType::Numeric,
        }],
    }));
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn prepare_execute_fetches_rows() -> Result<(), Db2PoolError> {
    let (driver, pool) = fake_pool(1).await?;
    driver.set_result(CUSTOMERS_BY_STATE, Ok(customer_rows()));

    let rows = pool
        .prepare_execute(CUSTOMERS_BY_STATE, &[ParamValue::from("NY")])
        .await?
        .expect("rows");

    assert_eq!(rows[0].get("cusnum"), Some(&RowValues::Int(938_472)));
    assert_eq!(pool.available_count(), 1);
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn prepare_execute_skips_bind_without_params() -> Result<(), Db2PoolError> {
    let (driver, pool) = fake_pool(1).await?;

    pool.prepare_execute("CALL QSYS2.RESET_STATS()", &[]).await?;

    assert!(
        !driver
            .calls()
            .iter()
            .any(|c| matches!(c, FakeCall::Bind { .. }))
    );
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn prepare_execute_failure_retires_without_fetch() -> Result<(), Db2PoolError> {
    let (driver, pool) = fake_pool(2).await?;
    driver.set_result(
        "UPDATE T SET X = ?",
        Err(DriverError::new("Row not found").with_code(100)),
    );

    let result = pool
        .prepare_execute("UPDATE T SET X = ?", &[ParamValue::Null])
        .await?;

    assert!(result.is_none());
    assert_eq!(pool.len(), 1);
    assert!(
        !driver
            .calls()
            .iter()
            .any(|c| matches!(c, FakeCall::FetchAll { .. }))
    );
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn prepare_execute_with_keeps_caller_directions() -> Result<(), Db2PoolError> {
    let (driver, pool) = fake_pool(1).await?;
    let params = vec![
        BindParam::new("QGPL", BindDirection::In),
        BindParam::new(0_i64, BindDirection::Out),
    ];

    pool.prepare_execute_with("CALL MYLIB.COUNT_OBJS(?, ?)", params.clone())
        .await?;

    assert!(
        driver
            .calls()
            .contains(&FakeCall::Bind { stmt: 0, params })
    );
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn helpers_grow_the_pool_when_everything_is_checked_out() -> Result<(), Db2PoolError> {
    let (_driver, pool) = fake_pool(1).await?;
    let _held = pool.attach().await?;

    assert!(pool.run_sql("VALUES 1").await?.is_none());
    assert_eq!(pool.len(), 2);
    assert_eq!(pool.available_count(), 1);
    Ok(())
}
