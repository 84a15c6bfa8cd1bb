use anyhow::Result;
use dynamodb_helper::{
    dynamodb::{DynamoDb, FieldType, Item, SecondaryIndex, Table, Update, Value},
    logging,
};
use tracing::{error, info};

const TABLE_NAME: &str = "MyTable";
const PRIMARY_KEY: &str = "ID";
const INDEX_NAME: &str = "MyGSI";

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging(logging::level_from_env()?)?;

    let sdk_config = aws_config::load_from_env().await;
    let table = Table::new(TABLE_NAME, PRIMARY_KEY).with_env_overrides()?;
    let ddb = DynamoDb::new(&sdk_config, table);

    let state = ddb.ensure_table().await?;
    info!("Table '{}' ready ({:?})", ddb.table().name(), state);

    let primary_key = ddb.table().primary_key().to_string();

    let item = Item::new()
        .set_string(&primary_key, "1")
        .set_string("Name", "Example");
    ddb.put_item(item).await?;

    let result = ddb.get_item("1").await?;
    info!("Get item: {:?}", result);

    let update = Update::new("SET #attrName = :attrValue")
        .name("#attrName", "Name")
        .value(":attrValue", Value::from("UpdatedValue"));
    let updated = ddb.update_item("1", &update).await?;
    info!("Updated attributes: {:?}", updated);

    ddb.delete_item("1").await?;

    let all_items = ddb.scan_table().await?;
    info!("Scan returned {} item(s)", all_items.len());

    let query_result = ddb.query_table("1").await?;
    info!("Query returned {} item(s)", query_result.len());

    let batch_items = [("2", "Item2"), ("3", "Item3")]
        .into_iter()
        .map(|(id, name)| {
            Item::new()
                .set_string(&primary_key, id)
                .set_string("Name", name)
        });
    ddb.batch_write_items(batch_items).await?;

    let index = SecondaryIndex::new(INDEX_NAME).with_key("Name", FieldType::String);
    match ddb.create_global_secondary_index(&index).await {
        Ok(()) => info!("Index '{INDEX_NAME}' requested"),
        Err(e) => error!("Error creating index '{INDEX_NAME}': {}", e),
    }

    Ok(())
}
