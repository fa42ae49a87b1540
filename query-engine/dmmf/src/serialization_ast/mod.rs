mod datamodel_ast;
mod mappings_ast;
mod schema_ast;

pub use datamodel_ast::*;
pub use mappings_ast::*;
pub use schema_ast::*;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DataModelMetaFormat {
    #[serde(rename = "datamodel")]
    pub data_model: Datamodel,
    pub schema: DmmfSchema,
    pub mappings: DmmfOperationMappings,
}
