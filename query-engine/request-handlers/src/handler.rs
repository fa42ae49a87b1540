use crate::{
    Action, ClientConfig, ClientError, EngineError, ModelDelegate, QueryEngine, engine::response_errors,
    logger::QUERY_TARGET,
};
use dmmf::DmmfHelper;
use prisma_value::{PrismaObject, PrismaValue};
use query_core::{make_document, unpack};
use std::fmt;
use user_facing_errors::{Callsite, PrintJsonWithErrorsArgs, print_json_with_errors};

/// Post-processing of the unpacked result, applied before `data_path` is followed.
pub type Unpacker = fn(PrismaValue) -> PrismaValue;

/// One client call.
#[derive(Debug, Clone)]
pub struct RequestParams {
    pub action: Action,
    pub model: Option<String>,
    pub args: Option<PrismaValue>,
    /// Keys to follow inside the root field's result.
    pub data_path: Vec<String>,
    /// `user.findMany`, `$executeRaw`, ... as the user wrote it.
    pub client_method: String,
    pub callsite: Option<Callsite>,
    pub unpacker: Option<Unpacker>,
}

impl RequestParams {
    pub fn new(action: Action, model: Option<&str>) -> Self {
        Self {
            action,
            model: model.map(ToOwned::to_owned),
            args: None,
            data_path: Vec::new(),
            client_method: client_method(model, action),
            callsite: None,
            unpacker: None,
        }
    }

    pub fn args(mut self, args: PrismaValue) -> Self {
        self.args = Some(args);
        self
    }

    pub fn data_path(mut self, data_path: Vec<String>) -> Self {
        self.data_path = data_path;
        self
    }

    pub fn callsite(mut self, callsite: Callsite) -> Self {
        self.callsite = Some(callsite);
        self
    }

    pub fn unpacker(mut self, unpacker: Option<Unpacker>) -> Self {
        self.unpacker = unpacker;
        self
    }
}

pub struct RequestHandler<'a> {
    dmmf: &'a DmmfHelper,
    engine: &'a (dyn QueryEngine + Send + Sync + 'a),
    config: ClientConfig,
}

impl fmt::Debug for RequestHandler<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestHandler").field("config", &self.config).finish()
    }
}

impl<'a> RequestHandler<'a> {
    pub fn new(dmmf: &'a DmmfHelper, engine: &'a (dyn QueryEngine + Send + Sync + 'a), config: ClientConfig) -> Self {
        Self { dmmf, engine, config }
    }

    pub fn dmmf(&self) -> &'a DmmfHelper {
        self.dmmf
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The delegate of a model, e.g. `handler.model("User")?.find_many(args)`.
    pub fn model(&self, name: &str) -> crate::Result<ModelDelegate<'_, 'a>> {
        let mapping = self
            .dmmf
            .mapping_for_model(name)
            .map_err(|_| ClientError::internal(format!("Could not find mapping for model {name}")))?;

        Ok(ModelDelegate::new(self, mapping))
    }

    /// Delegates for every model with mappings.
    pub fn models(&self) -> impl Iterator<Item = ModelDelegate<'_, 'a>> {
        self.dmmf.model_mappings().map(|mapping| ModelDelegate::new(self, mapping))
    }

    pub async fn execute_raw(&self, query: &str, parameters: Option<PrismaValue>) -> crate::Result<PrismaValue> {
        self.raw(Action::ExecuteRaw, query, parameters).await
    }

    pub async fn query_raw(&self, query: &str, parameters: Option<PrismaValue>) -> crate::Result<PrismaValue> {
        self.raw(Action::QueryRaw, query, parameters).await
    }

    async fn raw(&self, action: Action, query: &str, parameters: Option<PrismaValue>) -> crate::Result<PrismaValue> {
        let mut args = PrismaObject::from([("query".to_owned(), PrismaValue::from(query))]);

        if let Some(parameters) = parameters {
            args.insert("parameters".to_owned(), PrismaValue::Json(parameters.to_json()));
        }

        self.request(RequestParams::new(action, None).args(PrismaValue::Object(args)))
            .await
    }

    /// Builds, validates and sends the document of one call, then unpacks the response.
    pub async fn request(&self, params: RequestParams) -> crate::Result<PrismaValue> {
        let RequestParams {
            action,
            model,
            args,
            data_path,
            client_method,
            callsite,
            unpacker,
        } = params;

        let operation = action.operation();
        let root_field = self.resolve_root_field(action, model.as_deref())?;

        if self.dmmf.root_type(operation).field(root_field).is_none() {
            return Err(ClientError::internal(format!(
                "Could not find rootField {root_field} for action {action} for model {} on rootType {operation}",
                model.as_deref().unwrap_or("undefined"),
            )));
        }

        let document = make_document(self.dmmf, operation, root_field, args.as_ref());

        document.validate(
            args.as_ref(),
            false,
            Some(&client_method),
            self.config.error_format,
            callsite.as_ref(),
        )?;

        let query = document.to_string();

        if self.config.log_queries {
            let empty = PrismaValue::Object(PrismaObject::new());
            let echo = print_json_with_errors(PrintJsonWithErrorsArgs {
                ast: args.as_ref().unwrap_or(&empty),
                key_paths: &[],
                value_paths: &[],
                missing_items: &[],
            });

            tracing::debug!(target: QUERY_TARGET, "Prisma Client call:\nprisma.{client_method}({echo})");
            tracing::debug!(target: QUERY_TARGET, "Generated request:\n{query}\n");
        }

        let response = self.engine.request(&query).await?;

        if let Some(errors) = response_errors(&response) {
            return Err(ClientError::Engine(errors));
        }

        let data = match response {
            serde_json::Value::Object(mut response) => response.remove("data").unwrap_or_default(),
            other => return Err(EngineError::InvalidResponse(other.to_string()).into()),
        };

        let mut result = unpack(&document, &[root_field.to_owned()], data)?;

        if let Some(unpacker) = unpacker {
            result = unpacker(result);
        }

        Ok(follow(result, &data_path))
    }

    fn resolve_root_field(&self, action: Action, model: Option<&str>) -> crate::Result<&'a str> {
        match (action.is_raw(), model) {
            (false, None) => Err(ClientError::internal(format!("Model missing for action {action}"))),
            (true, Some(model)) => Err(ClientError::internal(format!(
                "executeRaw and queryRaw can't be executed on a model basis. The model {model} has been provided"
            ))),
            (true, None) => Ok(action.as_str()),
            (false, Some(model)) => {
                let mapping = self
                    .dmmf
                    .mapping_for_model(model)
                    .map_err(|_| ClientError::internal(format!("Could not find mapping for model {model}")))?;

                mapping.action(action.mapping_key()).ok_or_else(|| {
                    ClientError::internal(format!(
                        "Could not find rootField undefined for action {action} for model {model} on rootType {}",
                        action.operation()
                    ))
                })
            }
        }
    }
}

fn follow(mut value: PrismaValue, path: &[String]) -> PrismaValue {
    for key in path {
        value = match value {
            PrismaValue::Object(mut object) => object.shift_remove(key).unwrap_or(PrismaValue::Null),
            _ => return PrismaValue::Null,
        };
    }

    value
}

pub(crate) fn client_method(model: Option<&str>, action: Action) -> String {
    match model {
        Some(model) if !action.is_raw() => format!("{}.{action}", lower_camel(model)),
        _ => format!("${action}"),
    }
}

fn lower_camel(name: &str) -> String {
    let mut chars = name.chars();

    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_methods_are_lower_camel() {
        assert_eq!(client_method(Some("User"), Action::FindMany), "user.findMany");
        assert_eq!(client_method(Some("BlogPost"), Action::GroupBy), "blogPost.groupBy");
        assert_eq!(client_method(None, Action::ExecuteRaw), "$executeRaw");
    }

    #[test]
    fn data_paths_are_followed() {
        let value = PrismaValue::from(serde_json::json!({ "_count": { "_all": 3 } }));

        assert_eq!(
            follow(value.clone(), &["_count".to_owned(), "_all".to_owned()]),
            PrismaValue::Int(3)
        );
        assert_eq!(follow(value, &["_avg".to_owned()]), PrismaValue::Null);
    }
}
