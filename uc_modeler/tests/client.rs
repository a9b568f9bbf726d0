//! Tests for the modeler client against an in-memory warehouse

mod common;

use pretty_assertions::assert_eq;

use common::{orders_users_columns, orders_users_constraints, strings, test_config, MemoryWarehouse};
use uc_modeler::warehouse::apply_statements;
use uc_modeler::{DesignColumn, DesignModel, Error, ModelConverter, ModelerClient};

fn client(warehouse: MemoryWarehouse) -> ModelerClient<MemoryWarehouse> {
    ModelerClient::new(test_config(), warehouse)
}

fn scenario_warehouse() -> MemoryWarehouse {
    MemoryWarehouse::new(orders_users_columns(), orders_users_constraints())
}

#[tokio::test]
async fn test_listing_passes_through() {
    let client = client(scenario_warehouse());

    assert_eq!(client.list_catalogs().await.unwrap(), strings(&["cat"]));
    assert_eq!(client.list_schemas("cat").await.unwrap(), strings(&["sch"]));
    assert_eq!(client.list_tables("cat", "sch").await.unwrap(), strings(&["orders", "users"]));
}

#[tokio::test]
async fn test_fetch_graph_reconciles_metadata() {
    let client = client(scenario_warehouse());
    let graph = client.fetch_graph("cat", "sch").await.unwrap();

    assert_eq!(graph.tables.len(), 2);
    assert_eq!(graph.relationships.len(), 1);
    assert!(graph.table("orders").unwrap().column("user_id").unwrap().is_fk);
}

#[tokio::test]
async fn test_fetched_schema_regenerates_with_same_cardinality() {
    let client = client(scenario_warehouse());
    let graph = client.fetch_graph("cat", "sch").await.unwrap();
    let model = ModelConverter::to_design_model(&graph);

    let statements = client.preview_sql(&model, "cat", "sch");

    let creates = statements.iter().filter(|s| s.starts_with("CREATE TABLE")).count();
    let fks = statements.iter().filter(|s| s.contains("FOREIGN KEY")).count();
    assert_eq!(creates, graph.tables.len());
    assert_eq!(fks, graph.relationships.len());
}

#[tokio::test]
async fn test_apply_continues_past_failures() {
    let client = client(scenario_warehouse().rejecting("`users`"));
    let model = ModelConverter::to_design_model(&client.fetch_graph("cat", "sch").await.unwrap());

    let report = client.apply_model(&model, "cat", "sch").await;

    assert!(!report.dry_run);
    assert_eq!(report.attempted, 3);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failures.len(), 2);
    assert!(!report.is_success());
    assert_eq!(report.failures[0].index, 1);
    assert!(report.failures[0]
        .statement
        .starts_with("CREATE TABLE IF NOT EXISTS `cat`.`sch`.`users`"));
    assert_eq!(report.failures[1].index, 2);
    assert!(report.failures[1].message.contains("PERMISSION_DENIED"));
    assert!(report.started_at <= report.finished_at);

    // Every statement reached the warehouse
    assert_eq!(client.warehouse().executed().len(), 3);
    assert!(report.render_failures().contains("\n-- ERROR: "));
}

#[tokio::test]
async fn test_apply_success_executes_in_order() {
    let client = client(scenario_warehouse());
    let model = ModelConverter::to_design_model(&client.fetch_graph("cat", "sch").await.unwrap());

    let report = client.apply_model(&model, "cat", "sch").await;

    assert!(report.is_success());
    assert_eq!(report.succeeded, 3);
    assert_eq!(client.warehouse().executed(), client.preview_sql(&model, "cat", "sch"));
}

#[tokio::test]
async fn test_dry_run_executes_nothing() {
    let mut config = test_config();
    config.apply.dry_run = true;
    let client = ModelerClient::new(config, scenario_warehouse());
    let model = ModelConverter::to_design_model(&client.fetch_graph("cat", "sch").await.unwrap());

    let report = client.apply_model(&model, "cat", "sch").await;
    assert!(report.dry_run);
    assert_eq!(report.attempted, 0);
    assert!(report.is_success());

    let sql = client
        .create_table("cat", "sch", "t", &[DesignColumn::new("id", "INT")], &[])
        .await
        .unwrap();
    assert_eq!(sql, "CREATE TABLE IF NOT EXISTS `cat`.`sch`.`t` (`id` INT)");
    assert!(client.warehouse().executed().is_empty());
}

#[tokio::test]
async fn test_apply_empty_batch() {
    let warehouse = scenario_warehouse();
    let report = apply_statements(&warehouse, &[], &test_config().apply).await;

    assert_eq!(report.attempted, 0);
    assert!(report.is_success());
    assert_eq!(report.render_failures(), "");
}

#[tokio::test]
async fn test_create_table_failure_carries_statement() {
    let client = client(scenario_warehouse().rejecting("CREATE"));

    let result = client
        .create_table("cat", "sch", "t", &[DesignColumn::new("id", "INT")], &strings(&["id"]))
        .await;

    match result {
        Err(Error::ExecutionFailure { statement, message }) => {
            assert!(statement.starts_with("CREATE TABLE IF NOT EXISTS `cat`.`sch`.`t`"));
            assert!(message.contains("PERMISSION_DENIED"));
        }
        other => panic!("expected execution failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_input_never_reaches_warehouse() {
    let client = client(scenario_warehouse());

    let result = client
        .add_foreign_key(
            "cat",
            "sch",
            "orders",
            "users",
            &strings(&["a", "b"]),
            &strings(&["id"]),
            "fk",
        )
        .await;

    assert!(matches!(result, Err(Error::InvalidInput(_))));
    assert!(client.warehouse().executed().is_empty());
}

#[tokio::test]
async fn test_add_foreign_key_returns_executed_sql() {
    let client = client(scenario_warehouse());

    let sql = client
        .add_foreign_key(
            "cat",
            "sch",
            "orders",
            "users",
            &strings(&["user_id"]),
            &strings(&["id"]),
            "fk_orders_users",
        )
        .await
        .unwrap();

    assert_eq!(client.warehouse().executed(), vec![sql]);
}

#[tokio::test]
async fn test_import_design_reports_discarded_tables() {
    let client = client(scenario_warehouse());
    let mut current = DesignModel::new();
    current
        .upsert_table("scratch", vec![DesignColumn::new("id", "INT")])
        .unwrap();

    let outcome = client.import_design(&current, "cat", "sch").await.unwrap();

    assert_eq!(outcome.discarded_tables, strings(&["scratch"]));
    assert_eq!(outcome.model.table_names(), vec!["orders", "users"]);
}

#[tokio::test]
async fn test_failure_converts_to_error() {
    let client = client(scenario_warehouse().rejecting("ALTER"));
    let model = ModelConverter::to_design_model(&client.fetch_graph("cat", "sch").await.unwrap());

    let mut report = client.apply_model(&model, "cat", "sch").await;
    let error = report.failures.remove(0).into_error();

    let text = error.to_string();
    assert!(text.starts_with("Statement failed: "));
    assert!(text.contains("ALTER TABLE `cat`.`sch`.`orders`"));
}
