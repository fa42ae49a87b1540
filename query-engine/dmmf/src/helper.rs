use crate::{
    DmmfError,
    serialization_ast::*,
    types::*,
};
use indexmap::IndexMap;
use std::{
    collections::{HashMap, HashSet},
    ops::Index,
};

/// Read-only view over a DMMF document with every type reference resolved.
///
/// Built once per client and shared by every document built against it.
#[derive(Debug)]
pub struct DmmfHelper {
    datamodel: Datamodel,
    input_types: Vec<InputType>,
    output_types: Vec<OutputType>,
    enum_types: Vec<SchemaEnum>,
    input_type_map: HashMap<String, InputObjectTypeId>,
    output_type_map: HashMap<String, OutputObjectTypeId>,
    enum_map: HashMap<String, EnumTypeId>,
    composite_types: HashSet<String>,
    mappings: IndexMap<String, DmmfModelOperations>,
    other_operations: DmmfOtherOperations,
    root_field_map: HashMap<String, (RootType, usize)>,
    query_type: OutputObjectTypeId,
    mutation_type: OutputObjectTypeId,
}

impl DmmfHelper {
    pub fn from_json_str(json: &str) -> Result<Self, DmmfError> {
        let dmmf: DataModelMetaFormat = serde_json::from_str(json)?;
        Self::new(dmmf)
    }

    pub fn new(dmmf: DataModelMetaFormat) -> Result<Self, DmmfError> {
        let DataModelMetaFormat {
            data_model,
            schema,
            mappings,
        } = dmmf;

        // Model types first, the same precedence the client applies when names overlap.
        let input_defs: Vec<DmmfInputType> = by_namespace(schema.input_object_types);
        let output_defs: Vec<DmmfOutputType> = by_namespace(schema.output_object_types);
        let enum_defs: Vec<DmmfEnum> = by_namespace(schema.enum_types);

        let input_type_map = index_names(input_defs.iter().map(|t| &t.name), InputObjectTypeId);
        let output_type_map = index_names(output_defs.iter().map(|t| &t.name), OutputObjectTypeId);
        let enum_map = index_names(enum_defs.iter().map(|e| &e.name), EnumTypeId);

        let resolver = Resolver {
            input_type_map: &input_type_map,
            output_type_map: &output_type_map,
            enum_map: &enum_map,
        };

        let input_types = input_defs
            .into_iter()
            .map(|def| {
                let fields: Vec<SchemaArg> = def.fields.into_iter().map(|f| resolver.arg(f)).collect();

                InputType {
                    name: def.name,
                    constraints: InputTypeConstraints {
                        min_num_fields: def.constraints.min_num_fields,
                        max_num_fields: def.constraints.max_num_fields,
                    },
                    field_map: field_map(fields.iter().map(|f| &f.name)),
                    fields,
                }
            })
            .collect();

        let output_types: Vec<OutputType> = output_defs
            .into_iter()
            .map(|def| {
                let fields: Vec<SchemaField> = def
                    .fields
                    .into_iter()
                    .map(|f| SchemaField {
                        name: f.name,
                        is_nullable: f.is_nullable,
                        output_type: resolver.output_type(f.output_type),
                        args: f.args.into_iter().map(|a| resolver.arg(a)).collect(),
                    })
                    .collect();

                OutputType {
                    name: def.name,
                    field_map: field_map(fields.iter().map(|f| &f.name)),
                    fields,
                }
            })
            .collect();

        let enum_types = enum_defs
            .into_iter()
            .map(|def| SchemaEnum {
                name: def.name,
                values: def.values,
            })
            .collect();

        let query_type = *output_type_map
            .get(RootType::Query.type_name())
            .ok_or(DmmfError::MissingRootType("Query"))?;
        let mutation_type = *output_type_map
            .get(RootType::Mutation.type_name())
            .ok_or(DmmfError::MissingRootType("Mutation"))?;

        let mut root_field_map = HashMap::new();

        for (root_type, id) in [(RootType::Query, query_type), (RootType::Mutation, mutation_type)] {
            for (idx, field) in output_types[id.0].fields.iter().enumerate() {
                root_field_map.insert(field.name.clone(), (root_type, idx));
            }
        }

        let composite_types = data_model.types.iter().map(|t| t.name.clone()).collect();
        let model_mappings = mappings
            .model_operations
            .into_iter()
            .map(|m| (m.model.clone(), m))
            .collect();

        tracing::debug!(
            input_types = input_type_map.len(),
            output_types = output_type_map.len(),
            enums = enum_map.len(),
            "Loaded DMMF"
        );

        Ok(DmmfHelper {
            datamodel: data_model,
            input_types,
            output_types,
            enum_types,
            input_type_map,
            output_type_map,
            enum_map,
            composite_types,
            mappings: model_mappings,
            other_operations: mappings.other_operations,
            root_field_map,
            query_type,
            mutation_type,
        })
    }

    pub fn datamodel(&self) -> &Datamodel {
        &self.datamodel
    }

    pub fn output_type(&self, name: &str) -> Result<&OutputType, DmmfError> {
        self.output_type_map
            .get(name)
            .map(|id| &self[*id])
            .ok_or_else(|| DmmfError::not_found("output type", name))
    }

    /// Models are exposed as output types of the same name.
    pub fn output_type_for_model(&self, model: &str) -> Result<&OutputType, DmmfError> {
        self.output_type_map
            .get(model)
            .map(|id| &self[*id])
            .ok_or_else(|| DmmfError::not_found("model", model))
    }

    pub fn input_type(&self, name: &str) -> Result<&InputType, DmmfError> {
        self.input_type_map
            .get(name)
            .map(|id| &self[*id])
            .ok_or_else(|| DmmfError::not_found("input type", name))
    }

    pub fn enum_type(&self, name: &str) -> Result<&SchemaEnum, DmmfError> {
        self.enum_map
            .get(name)
            .map(|id| &self[*id])
            .ok_or_else(|| DmmfError::not_found("enum", name))
    }

    pub fn mapping_for_model(&self, model: &str) -> Result<&DmmfModelOperations, DmmfError> {
        self.mappings
            .get(model)
            .ok_or_else(|| DmmfError::not_found("mapping for model", model))
    }

    pub fn model_mappings(&self) -> impl Iterator<Item = &DmmfModelOperations> {
        self.mappings.values()
    }

    pub fn other_operations(&self) -> &DmmfOtherOperations {
        &self.other_operations
    }

    /// A field of the `Query` or `Mutation` type, by name (e.g. `createOneUser`).
    pub fn root_field(&self, name: &str) -> Result<(RootType, &SchemaField), DmmfError> {
        self.root_field_map
            .get(name)
            .map(|(root_type, idx)| (*root_type, &self.root_type(*root_type).fields[*idx]))
            .ok_or_else(|| DmmfError::not_found("root field", name))
    }

    pub fn root_field_for_action(&self, model: &str, action: &str) -> Result<(RootType, &SchemaField), DmmfError> {
        let mapping = self.mapping_for_model(model)?;
        let root_field = mapping
            .action(action)
            .ok_or_else(|| DmmfError::not_found("action", format!("{model}.{action}")))?;

        self.root_field(root_field)
    }

    pub fn query_type(&self) -> &OutputType {
        &self[self.query_type]
    }

    pub fn mutation_type(&self) -> &OutputType {
        &self[self.mutation_type]
    }

    pub fn root_type(&self, root_type: RootType) -> &OutputType {
        match root_type {
            RootType::Query => self.query_type(),
            RootType::Mutation => self.mutation_type(),
        }
    }

    /// Whether the name belongs to a composite type of the datamodel.
    pub fn is_composite_type(&self, name: &str) -> bool {
        self.composite_types.contains(name)
    }
}

impl Index<InputObjectTypeId> for DmmfHelper {
    type Output = InputType;

    fn index(&self, index: InputObjectTypeId) -> &Self::Output {
        &self.input_types[index.0]
    }
}

impl Index<OutputObjectTypeId> for DmmfHelper {
    type Output = OutputType;

    fn index(&self, index: OutputObjectTypeId) -> &Self::Output {
        &self.output_types[index.0]
    }
}

impl Index<EnumTypeId> for DmmfHelper {
    type Output = SchemaEnum;

    fn index(&self, index: EnumTypeId) -> &Self::Output {
        &self.enum_types[index.0]
    }
}

struct Resolver<'a> {
    input_type_map: &'a HashMap<String, InputObjectTypeId>,
    output_type_map: &'a HashMap<String, OutputObjectTypeId>,
    enum_map: &'a HashMap<String, EnumTypeId>,
}

impl Resolver<'_> {
    fn arg(&self, field: DmmfInputField) -> SchemaArg {
        SchemaArg {
            name: field.name,
            is_required: field.is_required,
            is_nullable: field.is_nullable,
            input_types: field.input_types.into_iter().map(|t| self.input_type(t)).collect(),
        }
    }

    fn input_type(&self, reference: DmmfTypeReference) -> SchemaArgInputType {
        let resolved = match reference.location {
            TypeLocation::InputObjectTypes => self.input_type_map.get(&reference.typ).map(|id| InputTypeRef::Object(*id)),
            TypeLocation::EnumTypes => self.enum_map.get(&reference.typ).map(|id| InputTypeRef::Enum(*id)),
            _ => None,
        };

        // Unresolvable references degrade to scalars of the same name.
        let (typ, location) = match resolved {
            Some(typ) => (typ, reference.location),
            None => (InputTypeRef::Scalar, TypeLocation::Scalar),
        };

        SchemaArgInputType {
            name: reference.typ,
            typ,
            is_list: reference.is_list,
            location,
            namespace: reference.namespace,
        }
    }

    fn output_type(&self, reference: DmmfTypeReference) -> FieldOutputType {
        let resolved = match reference.location {
            TypeLocation::OutputObjectTypes => self
                .output_type_map
                .get(&reference.typ)
                .map(|id| OutputTypeRef::Object(*id)),
            TypeLocation::EnumTypes => self.enum_map.get(&reference.typ).map(|id| OutputTypeRef::Enum(*id)),
            _ => None,
        };

        let (typ, location) = match resolved {
            Some(typ) => (typ, reference.location),
            None => (OutputTypeRef::Scalar, TypeLocation::Scalar),
        };

        FieldOutputType {
            name: reference.typ,
            typ,
            is_list: reference.is_list,
            location,
            namespace: reference.namespace,
        }
    }
}

fn by_namespace<T>(mut namespaces: IndexMap<String, Vec<T>>) -> Vec<T> {
    let mut out = namespaces.shift_remove("model").unwrap_or_default();
    out.extend(namespaces.shift_remove("prisma").unwrap_or_default());
    out.extend(namespaces.into_values().flatten());
    out
}

fn index_names<'a, Id>(names: impl Iterator<Item = &'a String>, id: impl Fn(usize) -> Id) -> HashMap<String, Id> {
    let mut map = HashMap::new();

    for (idx, name) in names.enumerate() {
        map.entry(name.clone()).or_insert_with(|| id(idx));
    }

    map
}

fn field_map<'a>(names: impl Iterator<Item = &'a String>) -> HashMap<String, usize> {
    names.enumerate().map(|(idx, name)| (name.clone(), idx)).collect()
}
