//! Per-model entry points. Besides the plain actions, `count`, `aggregate` and `groupBy` rewrite
//! their arguments into the selection the engine expects and reshape the result.

use crate::{Action, RequestHandler, RequestParams, Unpacker};
use dmmf::DmmfModelOperations;
use prisma_value::{PrismaObject, PrismaValue};
use std::collections::HashMap;

const AGGREGATE_KEYS: [&str; 5] = ["_avg", "_count", "_sum", "_min", "_max"];

#[derive(Debug, Clone)]
pub struct ModelDelegate<'h, 'a> {
    handler: &'h RequestHandler<'a>,
    model: &'a str,
    root_fields: HashMap<Action, &'a str>,
}

impl<'h, 'a> ModelDelegate<'h, 'a> {
    pub(crate) fn new(handler: &'h RequestHandler<'a>, mapping: &'a DmmfModelOperations) -> Self {
        let root_fields = mapping
            .actions()
            .filter_map(|(action, root_field)| Some((action.parse::<Action>().ok()?, root_field)))
            .collect();

        Self {
            handler,
            model: &mapping.model,
            root_fields,
        }
    }

    pub fn name(&self) -> &'a str {
        self.model
    }

    /// The root field an action of this model runs on, if the schema has one.
    pub fn root_field(&self, action: Action) -> Option<&'a str> {
        self.root_fields.get(&action.mapping_key().parse().ok()?).copied()
    }

    pub fn supports(&self, action: Action) -> bool {
        self.root_field(action).is_some()
    }

    pub async fn find_unique(&self, args: PrismaValue) -> crate::Result<PrismaValue> {
        self.action(Action::FindUnique, args).await
    }

    pub async fn find_first(&self, args: PrismaValue) -> crate::Result<PrismaValue> {
        self.action(Action::FindFirst, args).await
    }

    pub async fn find_many(&self, args: PrismaValue) -> crate::Result<PrismaValue> {
        self.action(Action::FindMany, args).await
    }

    pub async fn create(&self, args: PrismaValue) -> crate::Result<PrismaValue> {
        self.action(Action::Create, args).await
    }

    pub async fn create_many(&self, args: PrismaValue) -> crate::Result<PrismaValue> {
        self.action(Action::CreateMany, args).await
    }

    pub async fn update(&self, args: PrismaValue) -> crate::Result<PrismaValue> {
        self.action(Action::Update, args).await
    }

    pub async fn update_many(&self, args: PrismaValue) -> crate::Result<PrismaValue> {
        self.action(Action::UpdateMany, args).await
    }

    pub async fn upsert(&self, args: PrismaValue) -> crate::Result<PrismaValue> {
        self.action(Action::Upsert, args).await
    }

    pub async fn delete(&self, args: PrismaValue) -> crate::Result<PrismaValue> {
        self.action(Action::Delete, args).await
    }

    pub async fn delete_many(&self, args: PrismaValue) -> crate::Result<PrismaValue> {
        self.action(Action::DeleteMany, args).await
    }

    /// Runs any action with the arguments as given.
    pub async fn action(&self, action: Action, args: PrismaValue) -> crate::Result<PrismaValue> {
        self.handler.request(self.params(action).args(args)).await
    }

    pub async fn count(&self, args: PrismaValue) -> crate::Result<PrismaValue> {
        let (args, unpacker) = count_args(args);

        let params = self
            .params(Action::Aggregate)
            .args(args)
            .data_path(vec!["_count".to_owned()])
            .unpacker(unpacker);

        self.handler.request(params).await
    }

    pub async fn aggregate(&self, args: PrismaValue) -> crate::Result<PrismaValue> {
        let (args, unpacker) = aggregate_args(args);
        let params = self.params(Action::Aggregate).args(args).unpacker(unpacker);

        self.handler.request(params).await
    }

    pub async fn group_by(&self, args: PrismaValue) -> crate::Result<PrismaValue> {
        let (args, unpacker) = group_by_args(args);
        let params = self.params(Action::GroupBy).args(args).unpacker(unpacker);

        self.handler.request(params).await
    }

    fn params(&self, action: Action) -> RequestParams {
        RequestParams::new(action, Some(self.model))
    }
}

fn into_object(args: PrismaValue) -> PrismaObject {
    match args {
        PrismaValue::Object(object) => object,
        _ => PrismaObject::new(),
    }
}

fn select(value: PrismaValue) -> PrismaValue {
    PrismaValue::Object(PrismaObject::from([("select".to_owned(), value)]))
}

fn select_all(value: PrismaValue) -> PrismaValue {
    select(PrismaValue::Object(PrismaObject::from([("_all".to_owned(), value)])))
}

/// `count` is an aggregate selecting `_count`, of the given fields or of all rows.
pub(crate) fn count_args(args: PrismaValue) -> (PrismaValue, Option<Unpacker>) {
    let mut args = into_object(args);

    let (count, unpacker) = match args.get("select") {
        Some(fields @ PrismaValue::Object(_)) => (select(fields.clone()), None),
        _ => (select_all(PrismaValue::Boolean(true)), Some(collapse_count as Unpacker)),
    };

    let selection = PrismaObject::from([("_count".to_owned(), count)]);
    args.insert("select".to_owned(), PrismaValue::Object(selection));

    (PrismaValue::Object(args), unpacker)
}

/// Moves the aggregate keys into `select`.
pub(crate) fn aggregate_args(args: PrismaValue) -> (PrismaValue, Option<Unpacker>) {
    let mut rewritten = PrismaObject::new();
    let mut selection: Option<PrismaObject> = None;
    let mut unpacker: Option<Unpacker> = None;

    for (key, value) in into_object(args) {
        if !AGGREGATE_KEYS.contains(&key.as_str()) {
            rewritten.insert(key, value);
            continue;
        }

        let wrapped = if key == "_count" && !value.is_object() {
            unpacker = Some(collapse_count);
            select_all(value)
        } else {
            select(value)
        };

        selection.get_or_insert_with(PrismaObject::new).insert(key, wrapped);
    }

    merge_selection(&mut rewritten, selection);

    (PrismaValue::Object(rewritten), unpacker)
}

/// Like `aggregate`, and every `by` field is selected too.
pub(crate) fn group_by_args(args: PrismaValue) -> (PrismaValue, Option<Unpacker>) {
    let mut rewritten = PrismaObject::new();
    let mut selection: Option<PrismaObject> = None;
    let mut unpacker: Option<Unpacker> = None;

    for (key, value) in into_object(args) {
        if AGGREGATE_KEYS.contains(&key.as_str()) {
            let wrapped = if key == "_count" && matches!(value, PrismaValue::Boolean(_)) {
                unpacker = Some(collapse_row_counts);
                select_all(value)
            } else {
                select(value)
            };

            selection.get_or_insert_with(PrismaObject::new).insert(key, wrapped);
            continue;
        }

        if key == "by" {
            let fields = value.as_list().unwrap_or_default();

            for field in fields.iter().filter_map(PrismaValue::as_str) {
                selection
                    .get_or_insert_with(PrismaObject::new)
                    .insert(field.to_owned(), PrismaValue::Boolean(true));
            }
        }

        rewritten.insert(key, value);
    }

    merge_selection(&mut rewritten, selection);

    (PrismaValue::Object(rewritten), unpacker)
}

/// Aggregates given next to an explicit `select` extend it.
fn merge_selection(args: &mut PrismaObject, selection: Option<PrismaObject>) {
    let Some(selection) = selection else {
        return;
    };

    match args.get_mut("select").and_then(PrismaValue::as_object_mut) {
        Some(existing) => existing.extend(selection),
        None => {
            args.insert("select".to_owned(), PrismaValue::Object(selection));
        }
    }
}

/// `{ _count: { _all: n } }` becomes `{ _count: n }`.
fn collapse_count(mut data: PrismaValue) -> PrismaValue {
    if let Some(object) = data.as_object_mut() {
        if let Some(count) = object.get_mut("_count") {
            let all = count
                .as_object_mut()
                .and_then(|c| c.shift_remove("_all"))
                .unwrap_or(PrismaValue::Null);

            *count = all;
        }
    }

    data
}

fn collapse_row_counts(mut data: PrismaValue) -> PrismaValue {
    if let PrismaValue::List(rows) = &mut data {
        for row in rows.iter_mut() {
            let has_count = row
                .as_object()
                .and_then(|r| r.get("_count"))
                .and_then(PrismaValue::as_object)
                .and_then(|c| c.get("_all"))
                .is_some_and(PrismaValue::is_truthy);

            if has_count {
                *row = collapse_count(std::mem::replace(row, PrismaValue::Null));
            }
        }
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn value(json: serde_json::Value) -> PrismaValue {
        PrismaValue::from(json)
    }

    #[test]
    fn count_selects_all_rows_by_default() {
        let (args, unpacker) = count_args(value(json!({ "where": { "name": "Bob" } })));

        assert_eq!(
            args.to_json(),
            json!({ "where": { "name": "Bob" }, "select": { "_count": { "select": { "_all": true } } } })
        );

        let unpacker = unpacker.unwrap();
        assert_eq!(
            unpacker(value(json!({ "_count": { "_all": 4 } }))),
            value(json!({ "_count": 4 }))
        );
    }

    #[test]
    fn count_with_select_keeps_the_fields() {
        let (args, unpacker) = count_args(value(json!({ "select": { "email": true } })));

        assert_eq!(
            args.to_json(),
            json!({ "select": { "_count": { "select": { "email": true } } } })
        );
        assert!(unpacker.is_none());
    }

    #[test]
    fn aggregates_move_into_select() {
        let (args, unpacker) = aggregate_args(value(json!({
            "where": { "role": "ADMIN" },
            "_avg": { "balance": true },
            "_count": true,
        })));

        assert_eq!(
            args.to_json(),
            json!({
                "where": { "role": "ADMIN" },
                "select": {
                    "_avg": { "select": { "balance": true } },
                    "_count": { "select": { "_all": true } },
                },
            })
        );
        assert!(unpacker.is_some());
    }

    #[test]
    fn group_by_selects_the_by_fields() {
        let (args, unpacker) = group_by_args(value(json!({ "by": ["role"], "_count": true })));

        assert_eq!(
            args.to_json(),
            json!({
                "by": ["role"],
                "select": { "role": true, "_count": { "select": { "_all": true } } },
            })
        );

        let rows = value(json!([
            { "role": "ADMIN", "_count": { "_all": 2 } },
            { "role": "USER", "_count": { "_all": 0 } },
        ]));

        assert_eq!(
            unpacker.unwrap()(rows),
            value(json!([
                { "role": "ADMIN", "_count": 2 },
                { "role": "USER", "_count": { "_all": 0 } },
            ]))
        );
    }
}
