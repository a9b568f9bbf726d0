//! Tests for DDL generation and identifier quoting

mod common;

use pretty_assertions::assert_eq;
use rstest::*;

use common::{orders_users_columns, orders_users_constraints, strings, test_config};
use uc_modeler::config::DdlConfig;
use uc_modeler::schema::generator::{synthesized_constraint_name, EMPTY_SCRIPT};
use uc_modeler::schema::{default_constraint_name, render_script};
use uc_modeler::utils::quoting::{quote_ident, quote_qualified, Dialect};
use uc_modeler::{
    ConstraintResolver, DdlGenerator, DesignColumn, DesignModel, Error, ModelConverter,
    Relationship, SchemaGraphBuilder,
};

fn generator() -> DdlGenerator {
    DdlGenerator::new(&test_config().ddl)
}

fn orders_users_model() -> DesignModel {
    let resolved = ConstraintResolver::resolve(&orders_users_constraints());
    ModelConverter::to_design_model(&SchemaGraphBuilder::build(&orders_users_columns(), &resolved))
}

#[test]
fn test_create_table_for_orders() {
    let model = orders_users_model();
    let orders = &model.tables["orders"];

    let sql = generator()
        .create_table("cat", "sch", "orders", &orders.columns, &orders.primary_key_columns())
        .unwrap();

    assert_eq!(
        sql,
        "CREATE TABLE IF NOT EXISTS `cat`.`sch`.`orders` (`id` BIGINT NOT NULL, `user_id` BIGINT NOT NULL, CONSTRAINT `pk_orders` PRIMARY KEY (`id`))"
    );
}

#[test]
fn test_add_foreign_key_for_orders() {
    let sql = generator()
        .add_foreign_key(
            "cat",
            "sch",
            "orders",
            "users",
            &strings(&["user_id"]),
            &strings(&["id"]),
            "fk_orders_users",
        )
        .unwrap();

    assert_eq!(
        sql,
        "ALTER TABLE `cat`.`sch`.`orders` ADD CONSTRAINT `fk_orders_users` FOREIGN KEY (`user_id`) REFERENCES `cat`.`sch`.`users` (`id`)"
    );
}

#[test]
fn test_create_table_without_primary_key_or_guard() {
    let columns = vec![
        DesignColumn::new("created_at", "TIMESTAMP"),
        DesignColumn::new("note", " STRING ").nullable(false),
    ];

    let sql = generator()
        .with_if_not_exists(false)
        .create_table("cat", "sch", "events", &columns, &[])
        .unwrap();

    assert_eq!(
        sql,
        "CREATE TABLE `cat`.`sch`.`events` (`created_at` TIMESTAMP, `note` STRING NOT NULL)"
    );
}

#[test]
fn test_create_table_filters_incomplete_columns() {
    let columns = vec![
        DesignColumn::new("", "BIGINT"),
        DesignColumn::new("id", "BIGINT").nullable(false),
        DesignColumn::new("draft", "  "),
    ];

    let sql = generator()
        .create_table("cat", "sch", "t", &columns, &strings(&["id"]))
        .unwrap();

    assert_eq!(
        sql,
        "CREATE TABLE IF NOT EXISTS `cat`.`sch`.`t` (`id` BIGINT NOT NULL, CONSTRAINT `pk_t` PRIMARY KEY (`id`))"
    );
}

#[rstest]
#[case("", vec![DesignColumn::new("id", "BIGINT")])]
#[case("   ", vec![DesignColumn::new("id", "BIGINT")])]
#[case("t", vec![])]
#[case("t", vec![DesignColumn::new("id", "")])]
fn test_create_table_rejects_invalid_input(
    #[case] table: &str,
    #[case] columns: Vec<DesignColumn>,
) {
    let result = generator().create_table("cat", "sch", table, &columns, &[]);
    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[rstest]
#[case(vec![], vec![])]
#[case(vec!["a"], vec![])]
#[case(vec!["a", "b"], vec!["x"])]
fn test_add_foreign_key_rejects_unpaired_columns(
    #[case] child: Vec<&str>,
    #[case] parent: Vec<&str>,
) {
    let result = generator().add_foreign_key(
        "cat",
        "sch",
        "c",
        "p",
        &strings(&child),
        &strings(&parent),
        "fk",
    );
    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[test]
fn test_identifiers_with_quotes_are_escaped() {
    let columns = vec![DesignColumn::new("we`ird", "INT")];
    let sql = generator()
        .create_table("c`at", "sch", "t`1", &columns, &[])
        .unwrap();

    assert_eq!(
        sql,
        "CREATE TABLE IF NOT EXISTS `c``at`.`sch`.`t``1` (`we``ird` INT)"
    );
}

#[rstest]
#[case(Dialect::Databricks, "a`b", "`a``b`")]
#[case(Dialect::Mysql, "plain", "`plain`")]
#[case(Dialect::Postgres, "say \"hi\"", "\"say \"\"hi\"\"\"")]
#[case(Dialect::Postgres, "Orders", "\"Orders\"")]
fn test_quote_ident(#[case] dialect: Dialect, #[case] input: &str, #[case] expected: &str) {
    assert_eq!(quote_ident(dialect, input), expected);
}

#[test]
fn test_quote_qualified() {
    assert_eq!(quote_qualified(Dialect::Databricks, "cat", "sch", None), "`cat`.`sch`");
    assert_eq!(
        quote_qualified(Dialect::Postgres, "db", "public", Some("users")),
        "\"db\".\"public\".\"users\""
    );
}

#[test]
fn test_mysql_names_have_no_catalog() {
    assert_eq!(
        quote_qualified(Dialect::Mysql, "def", "shop", Some("orders")),
        "`shop`.`orders`"
    );

    let generator = DdlGenerator::new(&DdlConfig {
        dialect: Dialect::Mysql,
        if_not_exists: false,
    });
    let sql = generator
        .create_table("def", "shop", "t", &[DesignColumn::new("id", "INT")], &[])
        .unwrap();
    assert_eq!(sql, "CREATE TABLE `shop`.`t` (`id` INT)");
}

#[test]
fn test_postgres_dialect_generation() {
    let generator = DdlGenerator::new(&DdlConfig {
        dialect: Dialect::Postgres,
        if_not_exists: true,
    });

    let sql = generator
        .add_foreign_key("db", "public", "a", "b", &strings(&["b_id"]), &strings(&["id"]), "fk_a_b")
        .unwrap();
    assert_eq!(
        sql,
        "ALTER TABLE \"db\".\"public\".\"a\" ADD CONSTRAINT \"fk_a_b\" FOREIGN KEY (\"b_id\") REFERENCES \"db\".\"public\".\"b\" (\"id\")"
    );
}

#[test]
fn test_generate_from_model_puts_creates_first() {
    let model = orders_users_model();
    let statements = generator().generate_from_model(&model, "cat", "sch");

    assert_eq!(statements.len(), 3);
    assert!(statements[0].starts_with("CREATE TABLE IF NOT EXISTS `cat`.`sch`.`orders`"));
    assert!(statements[1].starts_with("CREATE TABLE IF NOT EXISTS `cat`.`sch`.`users`"));
    assert!(statements[2]
        .starts_with("ALTER TABLE `cat`.`sch`.`orders` ADD CONSTRAINT `fk_orders_users`"));
}

#[test]
fn test_generate_from_model_preserves_cardinality() {
    let model = orders_users_model();
    let statements = generator().generate_from_model(&model, "cat", "sch");

    let creates = statements.iter().filter(|s| s.starts_with("CREATE TABLE")).count();
    let fks = statements.iter().filter(|s| s.starts_with("ALTER TABLE")).count();
    assert_eq!(creates, model.tables.len());
    assert_eq!(fks, model.relationships.len());
}

#[test]
fn test_generate_from_model_is_idempotent() {
    let model = orders_users_model();
    let generator = generator();

    let first = generator.generate_from_model(&model, "cat", "sch");
    let second = generator.generate_from_model(&model, "cat", "sch");
    assert_eq!(render_script(&first), render_script(&second));
}

#[test]
fn test_unnamed_relationship_gets_synthesized_name() {
    let mut model = DesignModel::new();
    model
        .upsert_table("users", vec![DesignColumn::new("id", "BIGINT").primary_key()])
        .unwrap();
    model
        .upsert_table(
            "orders",
            vec![
                DesignColumn::new("id", "BIGINT").primary_key(),
                DesignColumn::new("user_id", "BIGINT"),
                DesignColumn::new("reviewer_id", "BIGINT"),
            ],
        )
        .unwrap();
    model
        .add_relationship(Relationship::new(
            "",
            "orders",
            "users",
            strings(&["user_id"]),
            strings(&["id"]),
        ))
        .unwrap();
    model
        .add_relationship(Relationship::new(
            "fk_orders_reviewer",
            "orders",
            "users",
            strings(&["reviewer_id"]),
            strings(&["id"]),
        ))
        .unwrap();

    let statements = generator().generate_from_model(&model, "cat", "sch");

    assert_eq!(statements.len(), 4);
    assert!(statements[2].contains("ADD CONSTRAINT `fk_orders_users_1`"));
    assert!(statements[3].contains("ADD CONSTRAINT `fk_orders_reviewer`"));
    assert_eq!(synthesized_constraint_name("orders", "users", 0), "fk_orders_users_1");
}

#[test]
fn test_tables_without_valid_columns_are_skipped() {
    let mut model = DesignModel::new();
    model.upsert_table("empty", vec![DesignColumn::new("x", "")]).unwrap();
    model.upsert_table("kept", vec![DesignColumn::new("id", "INT")]).unwrap();

    let statements = generator().generate_from_model(&model, "cat", "sch");
    assert_eq!(
        statements,
        vec!["CREATE TABLE IF NOT EXISTS `cat`.`sch`.`kept` (`id` INT)".to_string()]
    );
}

#[test]
fn test_render_script() {
    assert_eq!(render_script(&[]), EMPTY_SCRIPT);
    assert_eq!(render_script(&strings(&["A", "B"])), "A;\n\nB");
    assert_eq!(default_constraint_name("orders", "users"), "fk_orders_users");
}
