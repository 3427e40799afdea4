use crate::backend::{
    Backend, Credentials, DeleteRequest, GetRequest, Page, PutRequest, QueryRequest, ScanRequest,
    UpdateRequest,
};
use crate::common::{self, attributes::Attributes, condition::Conditions};
use crate::error::{Error, Result};

use aws_sdk_dynamodb::{Client, config, types};
use serde::Deserialize;
use std::{collections, env, fmt, sync::Arc};
use tokio::runtime;

const DEFAULT_REGION: &str = "us-east-1";

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

/// Connection settings for Amazon DynamoDB or a compatible endpoint.
///
/// ```rust
/// use dynamodb_frame::backend::aws::Settings;
///
/// let settings: Settings = serde_json::from_str(
///     r#"{"key": "AKIA", "secret": "s3cr3t", "endpoint": "http://localhost:8000"}"#,
/// )
/// .unwrap();
/// assert_eq!(settings.region, "us-east-1");
/// ```
#[derive(Clone, Deserialize, Eq, PartialEq)]
pub struct Settings {
    /// Access key id.
    pub key: String,
    /// Secret access key.
    pub secret: String,
    /// Region of the tables.
    #[serde(default = "default_region")]
    pub region: String,
    /// Endpoint override, e.g. DynamoDB Local.
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("key", &self.key)
            .field("secret", &"***")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl Settings {
    /// Read `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`, `AWS_REGION` and `DYNAMODB_ENDPOINT`.
    pub fn from_env() -> Result<Self> {
        let required = |name: &str| {
            env::var(name).map_err(|_| Error::Validation(format!("{name} is not set")))
        };
        Ok(Self {
            key: required("AWS_ACCESS_KEY_ID")?,
            secret: required("AWS_SECRET_ACCESS_KEY")?,
            region: env::var("AWS_REGION").unwrap_or_else(|_| default_region()),
            endpoint: env::var("DYNAMODB_ENDPOINT").ok(),
        })
    }
}

/// Credentials handing out SDK-backed handles.
///
/// The SDK is asynchronous; each handle drives it on a private current-thread
/// runtime, so every round trip blocks the calling thread and no worker
/// threads are started. Round trips attempted from inside another tokio
/// runtime fail with [`Error::Backend`].
#[derive(Clone, Debug)]
pub struct AwsCredentials {
    config: config::Config,
    runtime: Arc<runtime::Runtime>,
}

impl AwsCredentials {
    /// Static credentials for the given settings.
    pub fn new(settings: &Settings) -> Result<Self> {
        let provider = config::Credentials::new(
            &settings.key,
            &settings.secret,
            None,
            None,
            "dynamodb-frame",
        );
        let mut builder = config::Builder::new()
            .behavior_version(config::BehaviorVersion::latest())
            .region(config::Region::new(settings.region.clone()))
            .credentials_provider(provider);
        builder.set_endpoint_url(settings.endpoint.clone());
        Self::from_config(builder.build())
    }

    /// Credentials for an already assembled SDK configuration.
    pub fn from_config(config: config::Config) -> Result<Self> {
        let runtime = runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| Error::Backend(Box::new(error)))?;
        Ok(Self {
            config,
            runtime: Arc::new(runtime),
        })
    }
}

impl Credentials for AwsCredentials {
    fn connect(&self) -> Result<Box<dyn Backend>> {
        Ok(Box::new(AwsBackend {
            client: Client::from_conf(self.config.clone()),
            runtime: Arc::clone(&self.runtime),
        }))
    }
}

fn failure<E>(table_name: &str, error: E) -> Error
where
    aws_sdk_dynamodb::Error: From<E>,
{
    match aws_sdk_dynamodb::Error::from(error) {
        aws_sdk_dynamodb::Error::ConditionalCheckFailedException(_) => {
            Error::ConditionalCheckFailed {
                table: table_name.to_string(),
            }
        }
        aws_sdk_dynamodb::Error::ResourceNotFoundException(_) => {
            Error::TableNotFound(table_name.to_string())
        }
        other => Error::Backend(Box::new(other)),
    }
}

fn projection(attributes: &[String]) -> Option<common::ExpressionInput> {
    if attributes.is_empty() {
        return None;
    }
    let operations = attributes
        .iter()
        .map(|attribute| {
            let placeholder = common::name_placeholder(attribute);
            common::ExpressionInput {
                expression: placeholder.clone(),
                expression_attribute_names: collections::HashMap::from([(
                    placeholder,
                    attribute.clone(),
                )]),
                ..Default::default()
            }
        })
        .collect();
    Some(common::ExpressionInput::merge(", ", operations))
}

fn non_empty(expression: String) -> Option<String> {
    if expression.is_empty() {
        None
    } else {
        Some(expression)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
struct SingleReadInput {
    consistent_read: Option<bool>,
    expression_attribute_names: Option<collections::HashMap<String, String>>,
    keys: collections::HashMap<String, types::AttributeValue>,
    projection_expression: Option<String>,
    table_name: String,
}

impl From<GetRequest> for SingleReadInput {
    fn from(request: GetRequest) -> Self {
        let mut operation = Self {
            consistent_read: Some(request.consistent_read),
            keys: request.keys.into_item(),
            table_name: request.table_name,
            ..Default::default()
        };
        if let Some(selection) = projection(&request.attributes) {
            let expression = selection.merge_into(
                &mut operation.expression_attribute_names,
                &mut None,
            );
            operation.projection_expression = Some(expression);
        }
        operation
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
struct MultipleReadInput {
    consistent_read: Option<bool>,
    exclusive_start_key: Option<collections::HashMap<String, types::AttributeValue>>,
    expression_attribute_names: Option<collections::HashMap<String, String>>,
    expression_attribute_values: Option<collections::HashMap<String, types::AttributeValue>>,
    filter_expression: Option<String>,
    index_name: Option<String>,
    limit: Option<i32>,
    projection_expression: Option<String>,
    select: Option<types::Select>,
    table_name: String,
}

impl MultipleReadInput {
    fn new(
        table_name: String,
        filter: &Conditions,
        attributes: &[String],
        count: bool,
        index: &mut usize,
    ) -> Self {
        let mut operation = Self {
            select: count.then_some(types::Select::Count),
            table_name,
            ..Default::default()
        };
        if !filter.is_empty() {
            let expression = filter.get_expression_operation(index).merge_into(
                &mut operation.expression_attribute_names,
                &mut operation.expression_attribute_values,
            );
            operation.filter_expression = non_empty(expression);
        }
        if !count {
            if let Some(selection) = projection(attributes) {
                let expression = selection.merge_into(
                    &mut operation.expression_attribute_names,
                    &mut operation.expression_attribute_values,
                );
                operation.projection_expression = Some(expression);
            }
        }
        operation
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
struct QueryInput {
    key_condition_expression: String,
    multiple_read_operation: MultipleReadInput,
    scan_index_forward: Option<bool>,
}

impl From<QueryRequest> for QueryInput {
    fn from(request: QueryRequest) -> Self {
        let mut index = 0;
        let key_condition_operation = request.key_conditions.get_expression_operation(&mut index);
        let mut multiple_read_operation = MultipleReadInput::new(
            request.table_name,
            &request.filter,
            &request.attributes,
            request.count,
            &mut index,
        );
        multiple_read_operation.consistent_read = Some(request.consistent_read);
        multiple_read_operation.exclusive_start_key =
            request.exclusive_start_key.map(Attributes::into_item);
        multiple_read_operation.index_name = request.index_name;
        multiple_read_operation.limit = request.limit;
        let key_condition_expression = key_condition_operation.merge_into(
            &mut multiple_read_operation.expression_attribute_names,
            &mut multiple_read_operation.expression_attribute_values,
        );
        Self {
            key_condition_expression,
            multiple_read_operation,
            scan_index_forward: Some(request.scan_index_forward),
        }
    }
}

impl From<ScanRequest> for MultipleReadInput {
    fn from(request: ScanRequest) -> Self {
        let mut operation = Self::new(
            request.table_name,
            &request.filter,
            &request.attributes,
            request.count,
            &mut 0,
        );
        operation.exclusive_start_key = request.exclusive_start_key.map(Attributes::into_item);
        operation.limit = request.limit;
        operation
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
struct WriteInput {
    condition_expression: Option<String>,
    expression_attribute_names: Option<collections::HashMap<String, String>>,
    expression_attribute_values: Option<collections::HashMap<String, types::AttributeValue>>,
    table_name: String,
}

impl WriteInput {
    fn new(table_name: String, expected: &Conditions, index: &mut usize) -> Self {
        let mut operation = Self {
            table_name,
            ..Default::default()
        };
        if !expected.is_empty() {
            let expression = operation.merge_expression(expected.get_expression_operation(index));
            operation.condition_expression = non_empty(expression);
        }
        operation
    }

    /// Merge an expression operation into this write operation.
    fn merge_expression(&mut self, operation: common::ExpressionInput) -> String {
        operation.merge_into(
            &mut self.expression_attribute_names,
            &mut self.expression_attribute_values,
        )
    }
}

/// apply common multiple read operation settings to a builder
macro_rules! apply_multiple_read_operation {
    ($builder:expr, $multiple_read_operation:expr) => {
        $builder
            .set_consistent_read($multiple_read_operation.consistent_read)
            .set_exclusive_start_key($multiple_read_operation.exclusive_start_key)
            .set_expression_attribute_names($multiple_read_operation.expression_attribute_names)
            .set_expression_attribute_values($multiple_read_operation.expression_attribute_values)
            .set_filter_expression($multiple_read_operation.filter_expression)
            .set_index_name($multiple_read_operation.index_name)
            .set_limit($multiple_read_operation.limit)
            .set_projection_expression($multiple_read_operation.projection_expression)
            .set_select($multiple_read_operation.select)
            .table_name($multiple_read_operation.table_name)
    };
}

/// apply common write operation settings to a builder
macro_rules! apply_write_operation {
    ($builder:expr, $write_operation:expr) => {
        $builder
            .set_condition_expression($write_operation.condition_expression)
            .set_expression_attribute_names($write_operation.expression_attribute_names)
            .set_expression_attribute_values($write_operation.expression_attribute_values)
            .table_name($write_operation.table_name)
    };
}

/// get one page out of a query or scan output
macro_rules! get_page {
    ($output:expr) => {{
        let output = $output;
        let items = output
            .items
            .unwrap_or_default()
            .into_iter()
            .map(Attributes::from_item)
            .collect::<Result<Vec<_>>>()?;
        let last_evaluated_key = output
            .last_evaluated_key
            .filter(|key| !key.is_empty())
            .map(Attributes::from_item)
            .transpose()?;
        Ok(Page {
            count: usize::try_from(output.count).unwrap_or_default(),
            items,
            last_evaluated_key,
        })
    }};
}

/// One SDK client bound to the runtime that drives it.
#[derive(Debug)]
pub struct AwsBackend {
    client: Client,
    runtime: Arc<runtime::Runtime>,
}

impl AwsBackend {
    fn block_on<F: Future>(&self, future: F) -> Result<F::Output> {
        if runtime::Handle::try_current().is_ok() {
            return Err(Error::Backend(
                "cannot block on a DynamoDB round trip from inside an async runtime".into(),
            ));
        }
        Ok(self.runtime.block_on(future))
    }
}

impl Backend for AwsBackend {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_frame.get_item", skip(self), err)
    )]
    fn get_item(&self, request: GetRequest) -> Result<Option<Attributes>> {
        let get_item: SingleReadInput = request.into();
        let table_name = get_item.table_name.clone();
        let builder = self
            .client
            .get_item()
            .set_consistent_read(get_item.consistent_read)
            .set_expression_attribute_names(get_item.expression_attribute_names)
            .set_key(Some(get_item.keys))
            .set_projection_expression(get_item.projection_expression)
            .table_name(get_item.table_name);
        let output = self
            .block_on(builder.send())?
            .map_err(|error| failure(&table_name, error))?;
        output.item.map(Attributes::from_item).transpose()
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_frame.put_item", skip(self), err)
    )]
    fn put_item(&self, request: PutRequest) -> Result<()> {
        let write_operation = WriteInput::new(request.table_name, &request.expected, &mut 0);
        let table_name = write_operation.table_name.clone();
        let builder = self
            .client
            .put_item()
            .set_item(Some(request.item.into_item()));
        self.block_on(apply_write_operation!(builder, write_operation).send())?
            .map_err(|error| failure(&table_name, error))?;
        Ok(())
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_frame.delete_item", skip(self), err)
    )]
    fn delete_item(&self, request: DeleteRequest) -> Result<()> {
        let write_operation = WriteInput::new(request.table_name, &request.expected, &mut 0);
        let table_name = write_operation.table_name.clone();
        let builder = self
            .client
            .delete_item()
            .set_key(Some(request.keys.into_item()));
        self.block_on(apply_write_operation!(builder, write_operation).send())?
            .map_err(|error| failure(&table_name, error))?;
        Ok(())
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_frame.update_item", skip(self), err)
    )]
    fn update_item(&self, request: UpdateRequest) -> Result<()> {
        if request.updates.is_empty() {
            return Err(Error::Validation(
                "update needs at least one attribute update".to_string(),
            ));
        }
        let mut index = 0;
        let mut write_operation = WriteInput::new(request.table_name, &request.expected, &mut index);
        let update_expression =
            write_operation.merge_expression(request.updates.get_update_expression(&mut index));
        let table_name = write_operation.table_name.clone();
        let builder = self
            .client
            .update_item()
            .set_key(Some(request.keys.into_item()))
            .update_expression(update_expression);
        self.block_on(apply_write_operation!(builder, write_operation).send())?
            .map_err(|error| failure(&table_name, error))?;
        Ok(())
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_frame.query", skip(self), err)
    )]
    fn query(&self, request: QueryRequest) -> Result<Page> {
        let query: QueryInput = request.into();
        let table_name = query.multiple_read_operation.table_name.clone();
        let builder = self
            .client
            .query()
            .key_condition_expression(query.key_condition_expression)
            .set_scan_index_forward(query.scan_index_forward);
        let output = self
            .block_on(apply_multiple_read_operation!(builder, query.multiple_read_operation).send())?
            .map_err(|error| failure(&table_name, error))?;
        get_page!(output)
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_frame.scan", skip(self), err)
    )]
    fn scan(&self, request: ScanRequest) -> Result<Page> {
        let scan: MultipleReadInput = request.into();
        let table_name = scan.table_name.clone();
        let builder = self.client.scan();
        let output = self
            .block_on(apply_multiple_read_operation!(builder, scan).send())?
            .map_err(|error| failure(&table_name, error))?;
        get_page!(output)
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_frame.key_schema", skip(self), err)
    )]
    fn key_schema(&self, table_name: &str) -> Result<Vec<String>> {
        let output = self
            .block_on(self.client.describe_table().table_name(table_name).send())?
            .map_err(|error| failure(table_name, error))?;
        let mut schema = output
            .table
            .and_then(|table| table.key_schema)
            .unwrap_or_default();
        schema.sort_by_key(|element| element.key_type != types::KeyType::Hash);
        Ok(schema
            .into_iter()
            .map(|element| element.attribute_name)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{condition::Condition, value::Value};

    use rstest::rstest;

    #[rstest]
    #[case::keys_only(
        QueryRequest {
            key_conditions: Conditions::new().with_equal("a", "b"),
            limit: Some(1),
            scan_index_forward: true,
            table_name: "c".to_string(),
            ..Default::default()
        },
        QueryInput {
            key_condition_expression: "#a = :a_eq0".to_string(),
            multiple_read_operation: MultipleReadInput {
                consistent_read: Some(false),
                expression_attribute_names: Some(
                    collections::HashMap::from(
                        [
                            ("#a".to_string(), "a".to_string()),
                        ]
                    )
                ),
                expression_attribute_values: Some(
                    collections::HashMap::from(
                        [
                            (
                                ":a_eq0".to_string(),
                                types::AttributeValue::S(
                                    "b".to_string()
                                )
                            ),
                        ]
                    )
                ),
                limit: Some(1),
                table_name: "c".to_string(),
                ..Default::default()
            },
            scan_index_forward: Some(true),
        }
    )]
    #[case::full(
        QueryRequest {
            attributes: vec![
                "d".to_string(),
            ],
            consistent_read: true,
            exclusive_start_key: Some(
                Attributes::new().with("a", "b").with("e", 1)
            ),
            filter: Conditions::new().with("f", Condition::GreaterThan(Value::from(2))),
            index_name: Some(
                "g".to_string()
            ),
            key_conditions: Conditions::new()
                .with_equal("a", "b")
                .with("e", Condition::LessThan(Value::from(9))),
            limit: Some(10),
            table_name: "c".to_string(),
            ..Default::default()
        },
        QueryInput {
            key_condition_expression: "#a = :a_eq0 AND #e < :e_lt1".to_string(),
            multiple_read_operation: MultipleReadInput {
                consistent_read: Some(true),
                exclusive_start_key: Some(
                    collections::HashMap::from(
                        [
                            (
                                "a".to_string(),
                                types::AttributeValue::S(
                                    "b".to_string()
                                )
                            ),
                            (
                                "e".to_string(),
                                types::AttributeValue::N(
                                    "1".to_string()
                                )
                            ),
                        ]
                    )
                ),
                expression_attribute_names: Some(
                    collections::HashMap::from(
                        [
                            ("#a".to_string(), "a".to_string()),
                            ("#d".to_string(), "d".to_string()),
                            ("#e".to_string(), "e".to_string()),
                            ("#f".to_string(), "f".to_string()),
                        ]
                    )
                ),
                expression_attribute_values: Some(
                    collections::HashMap::from(
                        [
                            (
                                ":a_eq0".to_string(),
                                types::AttributeValue::S(
                                    "b".to_string()
                                )
                            ),
                            (
                                ":e_lt1".to_string(),
                                types::AttributeValue::N(
                                    "9".to_string()
                                )
                            ),
                            (
                                ":f_gt2".to_string(),
                                types::AttributeValue::N(
                                    "2".to_string()
                                )
                            ),
                        ]
                    )
                ),
                filter_expression: Some(
                    "#f > :f_gt2".to_string()
                ),
                index_name: Some(
                    "g".to_string()
                ),
                limit: Some(10),
                projection_expression: Some(
                    "#d".to_string()
                ),
                table_name: "c".to_string(),
                ..Default::default()
            },
            scan_index_forward: Some(false),
        }
    )]
    fn test_query(#[case] request: QueryRequest, #[case] expected: QueryInput) {
        let actual: QueryInput = request.into();
        assert_eq!(actual, expected);
    }

    #[rstest]
    #[case::empty(
        ScanRequest {
            table_name: "a".to_string(),
            ..Default::default()
        },
        MultipleReadInput {
            table_name: "a".to_string(),
            ..Default::default()
        }
    )]
    #[case::count_ignores_projection(
        ScanRequest {
            attributes: vec![
                "b".to_string(),
            ],
            count: true,
            filter: Conditions::new().with("c", Condition::NotNull),
            limit: Some(5),
            table_name: "a".to_string(),
            ..Default::default()
        },
        MultipleReadInput {
            expression_attribute_names: Some(
                collections::HashMap::from(
                    [
                        ("#c".to_string(), "c".to_string()),
                    ]
                )
            ),
            filter_expression: Some(
                "attribute_exists(#c)".to_string()
            ),
            limit: Some(5),
            select: Some(
                types::Select::Count
            ),
            table_name: "a".to_string(),
            ..Default::default()
        }
    )]
    #[case::non_ascii_names(
        ScanRequest {
            filter: Conditions::new()
                .with_equal("名前", "x")
                .with_equal("住所", "y"),
            table_name: "a".to_string(),
            ..Default::default()
        },
        MultipleReadInput {
            expression_attribute_names: Some(
                collections::HashMap::from(
                    [
                        ("#_e5_90_8d_e5_89_8d".to_string(), "名前".to_string()),
                        ("#_e4_bd_8f_e6_89_80".to_string(), "住所".to_string()),
                    ]
                )
            ),
            expression_attribute_values: Some(
                collections::HashMap::from(
                    [
                        (
                            ":_e5_90_8d_e5_89_8d_eq0".to_string(),
                            types::AttributeValue::S(
                                "x".to_string()
                            )
                        ),
                        (
                            ":_e4_bd_8f_e6_89_80_eq1".to_string(),
                            types::AttributeValue::S(
                                "y".to_string()
                            )
                        ),
                    ]
                )
            ),
            filter_expression: Some(
                "#_e5_90_8d_e5_89_8d = :_e5_90_8d_e5_89_8d_eq0 AND #_e4_bd_8f_e6_89_80 = :_e4_bd_8f_e6_89_80_eq1".to_string()
            ),
            table_name: "a".to_string(),
            ..Default::default()
        }
    )]
    fn test_scan(#[case] request: ScanRequest, #[case] expected: MultipleReadInput) {
        let actual: MultipleReadInput = request.into();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_get_item_projects_attributes() {
        let actual: SingleReadInput = GetRequest {
            attributes: vec!["b".to_string()],
            consistent_read: true,
            keys: Attributes::from([("a", "x")]),
            table_name: "c".to_string(),
        }
        .into();
        let expected = SingleReadInput {
            consistent_read: Some(true),
            expression_attribute_names: Some(collections::HashMap::from([(
                "#b".to_string(),
                "b".to_string(),
            )])),
            keys: collections::HashMap::from([(
                "a".to_string(),
                types::AttributeValue::S("x".to_string()),
            )]),
            projection_expression: Some("#b".to_string()),
            table_name: "c".to_string(),
        };
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_write_input_guards_on_keys() {
        let keys = Attributes::new().with("a", "x").with("b", 1);
        let actual = WriteInput::new("c".to_string(), &Conditions::equal_to(&keys), &mut 0);
        assert_eq!(
            actual.condition_expression.as_deref(),
            Some("#a = :a_eq0 AND #b = :b_eq1")
        );
        let unconditional = WriteInput::new("c".to_string(), &Conditions::new(), &mut 0);
        assert_eq!(unconditional.condition_expression, None);
        assert_eq!(unconditional.expression_attribute_names, None);
    }

    fn local_settings() -> Settings {
        Settings {
            key: "k".to_string(),
            secret: "s".to_string(),
            region: "eu-west-1".to_string(),
            endpoint: Some("http://localhost:8000".to_string()),
        }
    }

    #[test]
    fn test_credentials_keep_endpoint_override() {
        let credentials = AwsCredentials::new(&local_settings()).unwrap();
        assert_eq!(
            credentials.config.endpoint_url(),
            Some("http://localhost:8000")
        );
        assert!(credentials.connect().is_ok());
    }

    #[test]
    fn test_empty_update_never_reaches_the_service() {
        let backend = AwsCredentials::new(&local_settings())
            .unwrap()
            .connect()
            .unwrap();
        let result = backend.update_item(UpdateRequest {
            keys: Attributes::new().with("id", "u1"),
            table_name: "users".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_round_trip_inside_async_runtime_fails() {
        let backend = AwsCredentials::new(&local_settings())
            .unwrap()
            .connect()
            .unwrap();
        let outer = runtime::Builder::new_current_thread().build().unwrap();
        let result = outer.block_on(async {
            backend.get_item(GetRequest {
                keys: Attributes::new().with("id", "u1"),
                table_name: "users".to_string(),
                ..Default::default()
            })
        });
        assert!(matches!(result, Err(Error::Backend(_))));
    }

    #[test]
    fn test_settings_hide_secret() {
        let settings: Settings =
            serde_json::from_str(r#"{"key": "k", "secret": "s", "region": "eu-west-1"}"#).unwrap();
        assert_eq!(settings.region, "eu-west-1");
        assert_eq!(settings.endpoint, None);
        assert!(!format!("{settings:?}").contains("\"s\""));
    }
}
