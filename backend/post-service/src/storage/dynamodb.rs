/// DynamoDB record store adapter
///
/// Items are attribute-typed maps:
/// `{ id: S, title: S, content: S, images: L[S] }`
use super::{RecordStore, StorageError, StorageResult};
use crate::config::DynamoConfig;
use crate::models::{Post, PostChanges};
use async_trait::async_trait;
use aws_sdk_dynamodb::config::Region;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client;
use std::collections::HashMap;

type Item = HashMap<String, AttributeValue>;

const ATTR_ID: &str = "id";
const ATTR_TITLE: &str = "title";
const ATTR_CONTENT: &str = "content";
const ATTR_IMAGES: &str = "images";

pub struct DynamoRecordStore {
    client: Client,
    table_name: String,
}

impl DynamoRecordStore {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// Build a client from the ambient AWS credentials chain
    pub async fn connect(config: &DynamoConfig) -> Self {
        let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_dynamodb::config::Builder::from(&aws_config);
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }

        tracing::debug!(
            table = %config.table_name,
            endpoint = config.endpoint_url.as_deref().unwrap_or("aws"),
            "DynamoDB client configured"
        );

        Self::new(Client::from_conf(builder.build()), config.table_name.clone())
    }

    /// Health check for table reachability
    pub async fn health_check(&self) -> StorageResult<()> {
        self.client
            .describe_table()
            .table_name(&self.table_name)
            .send()
            .await
            .map_err(|e| record_error("describe table", e))?;
        Ok(())
    }

    fn key(id: &str) -> (String, AttributeValue) {
        (ATTR_ID.to_string(), AttributeValue::S(id.to_string()))
    }
}

#[async_trait]
impl RecordStore for DynamoRecordStore {
    async fn get(&self, id: &str) -> StorageResult<Option<Post>> {
        let (name, value) = Self::key(id);
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(name, value)
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| record_error("get item", e))?;

        output.item().map(item_to_post).transpose()
    }

    async fn put(&self, post: &Post) -> StorageResult<()> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(post_to_item(post)))
            .send()
            .await
            .map_err(|e| record_error("put item", e))?;
        Ok(())
    }

    async fn update(&self, id: &str, changes: &PostChanges) -> StorageResult<Post> {
        // An empty SET expression is rejected by DynamoDB.
        if changes.is_empty() {
            return self
                .get(id)
                .await?
                .ok_or_else(|| StorageError::RecordStore(format!("update of missing record {id}")));
        }

        let update = UpdateExpression::from_changes(changes);
        let (name, value) = Self::key(id);

        let output = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key(name, value)
            .update_expression(update.expression)
            .set_expression_attribute_names(Some(update.names))
            .set_expression_attribute_values(Some(update.values))
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(|e| record_error("update item", e))?;

        let item = output.attributes().ok_or_else(|| {
            StorageError::MalformedItem(format!("update of {id} returned no attributes"))
        })?;
        item_to_post(item)
    }

    async fn delete(&self, id: &str) -> StorageResult<()> {
        let (name, value) = Self::key(id);
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key(name, value)
            .send()
            .await
            .map_err(|e| record_error("delete item", e))?;
        Ok(())
    }

    async fn scan_all(&self) -> StorageResult<Vec<Post>> {
        let items: Vec<Item> = self
            .client
            .scan()
            .table_name(&self.table_name)
            .consistent_read(true)
            .into_paginator()
            .items()
            .send()
            .try_collect()
            .await
            .map_err(|e| record_error("scan", e))?;

        items.iter().map(item_to_post).collect()
    }
}

fn record_error<E>(operation: &str, err: E) -> StorageError
where
    E: std::error::Error + 'static,
{
    StorageError::RecordStore(format!("{operation} failed: {}", DisplayErrorContext(&err)))
}

/// `SET` expression with placeholder maps for one update call
#[derive(Debug)]
struct UpdateExpression {
    expression: String,
    names: HashMap<String, String>,
    values: Item,
}

impl UpdateExpression {
    fn from_changes(changes: &PostChanges) -> Self {
        let mut assignments = Vec::new();
        let mut names = HashMap::new();
        let mut values = HashMap::new();

        let mut assign = |attr: &str, value: AttributeValue| {
            assignments.push(format!("#{attr} = :{attr}"));
            names.insert(format!("#{attr}"), attr.to_string());
            values.insert(format!(":{attr}"), value);
        };

        if let Some(title) = &changes.title {
            assign(ATTR_TITLE, AttributeValue::S(title.clone()));
        }
        if let Some(content) = &changes.content {
            assign(ATTR_CONTENT, AttributeValue::S(content.clone()));
        }
        if let Some(images) = &changes.images {
            assign(ATTR_IMAGES, images_attribute(images));
        }

        Self {
            expression: format!("SET {}", assignments.join(", ")),
            names,
            values,
        }
    }
}

fn images_attribute(images: &[String]) -> AttributeValue {
    AttributeValue::L(images.iter().cloned().map(AttributeValue::S).collect())
}

pub(crate) fn post_to_item(post: &Post) -> Item {
    HashMap::from([
        (ATTR_ID.to_string(), AttributeValue::S(post.id.clone())),
        (ATTR_TITLE.to_string(), AttributeValue::S(post.title.clone())),
        (ATTR_CONTENT.to_string(), AttributeValue::S(post.content.clone())),
        (ATTR_IMAGES.to_string(), images_attribute(&post.images)),
    ])
}

pub(crate) fn item_to_post(item: &Item) -> StorageResult<Post> {
    let id = string_attr(item, ATTR_ID, "<unknown>")?;
    let title = string_attr(item, ATTR_TITLE, &id)?;
    let content = string_attr(item, ATTR_CONTENT, &id)?;

    let images = match item.get(ATTR_IMAGES) {
        None | Some(AttributeValue::Null(_)) => Vec::new(),
        Some(AttributeValue::L(values)) => values
            .iter()
            .map(|value| {
                value.as_s().cloned().map_err(|_| {
                    StorageError::MalformedItem(format!("{id}: image entry is not a string"))
                })
            })
            .collect::<StorageResult<Vec<_>>>()?,
        // String sets come back from items written by other tools.
        Some(AttributeValue::Ss(values)) => values.clone(),
        Some(_) => {
            return Err(StorageError::MalformedItem(format!(
                "{id}: images is not a list"
            )))
        }
    };

    Ok(Post {
        id,
        title,
        content,
        images,
    })
}

fn string_attr(item: &Item, name: &str, id: &str) -> StorageResult<String> {
    item.get(name)
        .and_then(|value| value.as_s().ok())
        .cloned()
        .ok_or_else(|| StorageError::MalformedItem(format!("{id}: missing string attribute {name}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Post {
        Post {
            id: "abc".to_string(),
            title: "hello".to_string(),
            content: "world".to_string(),
            images: vec![
                "https://bucket/abc/1.png".to_string(),
                "https://bucket/abc/2.png".to_string(),
            ],
        }
    }

    #[test]
    fn test_item_shape() {
        let item = post_to_item(&sample());

        assert_eq!(item.get("id"), Some(&AttributeValue::S("abc".to_string())));
        assert_eq!(
            item.get("images"),
            Some(&AttributeValue::L(vec![
                AttributeValue::S("https://bucket/abc/1.png".to_string()),
                AttributeValue::S("https://bucket/abc/2.png".to_string()),
            ]))
        );
        assert_eq!(item_to_post(&item).unwrap(), sample());
    }

    #[test]
    fn test_missing_images_reads_as_empty() {
        let mut item = post_to_item(&sample());
        item.remove("images");

        assert!(item_to_post(&item).unwrap().images.is_empty());
    }

    #[test]
    fn test_missing_title_is_malformed() {
        let mut item = post_to_item(&sample());
        item.remove("title");

        let err = item_to_post(&item).unwrap_err();
        assert!(matches!(err, StorageError::MalformedItem(msg) if msg.contains("title")));
    }

    #[test]
    fn test_non_string_image_is_malformed() {
        let mut item = post_to_item(&sample());
        item.insert(
            "images".to_string(),
            AttributeValue::L(vec![AttributeValue::N("1".to_string())]),
        );

        assert!(matches!(
            item_to_post(&item),
            Err(StorageError::MalformedItem(_))
        ));
    }

    #[test]
    fn test_update_expression_assigns_only_supplied_fields() {
        let update = UpdateExpression::from_changes(&PostChanges {
            title: Some("t".to_string()),
            images: Some(Vec::new()),
            ..Default::default()
        });

        assert_eq!(update.expression, "SET #title = :title, #images = :images");
        assert_eq!(update.names.get("#title"), Some(&"title".to_string()));
        assert_eq!(update.names.len(), 2);
        assert_eq!(
            update.values.get(":images"),
            Some(&AttributeValue::L(Vec::new()))
        );
        assert!(!update.values.contains_key(":content"));
    }
}
