use crate::*;
use pretty_assertions::assert_eq;

fn blog() -> DmmfHelper {
    DmmfHelper::from_json_str(include_str!("../test-files/blog.dmmf.json")).unwrap()
}

#[test]
fn resolves_type_references_into_ids() {
    let dmmf = blog();
    let (root_type, find_many) = dmmf.root_field("findManyUser").unwrap();

    assert_eq!(root_type, RootType::Query);
    assert!(find_many.output_type.is_list);

    let user = &dmmf[find_many.output_type.as_object().unwrap()];
    assert_eq!(user.name, "User");

    let where_arg = find_many.arg("where").unwrap();
    let where_type = &dmmf[where_arg.input_types[0].as_object().unwrap()];
    assert_eq!(where_type.name, "UserWhereInput");

    let role = where_type.field("role").unwrap();
    let role_enum = &dmmf[role.input_types[0].as_enum().unwrap()];
    assert_eq!(role_enum.values, vec!["USER", "ADMIN"]);
}

#[test]
fn constraints_are_kept() {
    let dmmf = blog();
    let order_by = dmmf.input_type("UserOrderByInput").unwrap();

    assert_eq!(order_by.constraints.max_num_fields, Some(1));
    assert_eq!(order_by.constraints.min_num_fields, Some(0));
}

#[test]
fn root_fields_are_found_through_model_mappings() {
    let dmmf = blog();

    let (root_type, field) = dmmf.root_field_for_action("User", "create").unwrap();
    assert_eq!(root_type, RootType::Mutation);
    assert_eq!(field.name, "createOneUser");

    let actions: Vec<_> = dmmf.mapping_for_model("Post").unwrap().actions().collect();
    assert_eq!(actions, vec![("findMany", "findManyPost")]);
}

#[test]
fn absent_names_are_reported_not_panicked() {
    let dmmf = blog();

    let err = dmmf.output_type_for_model("Comment").unwrap_err();
    assert_eq!(err.to_string(), "Could not find model `Comment` in the DMMF");

    let err = dmmf.root_field_for_action("Post", "upsert").unwrap_err();
    assert_eq!(err.to_string(), "Could not find action `Post.upsert` in the DMMF");

    assert!(dmmf.mapping_for_model("Comment").is_err());
    assert!(dmmf.enum_type("Color").is_err());
}

#[test]
fn composite_types_come_from_the_datamodel() {
    let dmmf = blog();

    assert!(dmmf.is_composite_type("Address"));
    assert!(!dmmf.is_composite_type("Post"));
}

#[test]
fn missing_root_types_are_rejected() {
    let err = DmmfHelper::from_json_str(r#"{ "datamodel": {}, "schema": {}, "mappings": {} }"#).unwrap_err();
    assert_eq!(err.to_string(), "The DMMF does not declare a `Query` root type");
}

#[test]
fn the_helper_can_be_shared_between_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DmmfHelper>();
}
