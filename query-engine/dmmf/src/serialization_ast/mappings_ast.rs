#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DmmfOperationMappings {
    pub model_operations: Vec<DmmfModelOperations>,
    pub other_operations: DmmfOtherOperations,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DmmfOtherOperations {
    pub read: Vec<String>,
    pub write: Vec<String>,
}

/// Root field names of a model, one per action.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DmmfModelOperations {
    pub model: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregate: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_by: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub find_unique: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub find_first: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub find_many: Option<String>,

    #[serde(alias = "createOne", skip_serializing_if = "Option::is_none")]
    pub create: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_many: Option<String>,

    #[serde(alias = "updateOne", skip_serializing_if = "Option::is_none")]
    pub update: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_many: Option<String>,

    #[serde(alias = "upsertOne", skip_serializing_if = "Option::is_none")]
    pub upsert: Option<String>,

    #[serde(alias = "deleteOne", skip_serializing_if = "Option::is_none")]
    pub delete: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_many: Option<String>,
}

impl DmmfModelOperations {
    /// The root field for a client action name (`findMany`, `create`, ...).
    pub fn action(&self, action: &str) -> Option<&str> {
        let root_field = match action {
            "aggregate" => &self.aggregate,
            "groupBy" => &self.group_by,
            "findUnique" => &self.find_unique,
            "findFirst" => &self.find_first,
            "findMany" => &self.find_many,
            "create" => &self.create,
            "createMany" => &self.create_many,
            "update" => &self.update,
            "updateMany" => &self.update_many,
            "upsert" => &self.upsert,
            "delete" => &self.delete,
            "deleteMany" => &self.delete_many,
            _ => return None,
        };

        root_field.as_deref()
    }

    /// All `(action, root field)` pairs the model supports.
    pub fn actions(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("findUnique", &self.find_unique),
            ("findFirst", &self.find_first),
            ("findMany", &self.find_many),
            ("create", &self.create),
            ("createMany", &self.create_many),
            ("update", &self.update),
            ("updateMany", &self.update_many),
            ("upsert", &self.upsert),
            ("delete", &self.delete),
            ("deleteMany", &self.delete_many),
            ("aggregate", &self.aggregate),
            ("groupBy", &self.group_by),
        ]
        .into_iter()
        .filter_map(|(action, root_field)| root_field.as_deref().map(|rf| (action, rf)))
    }
}
