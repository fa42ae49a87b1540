use crate::ClientError;
use dmmf::RootType;
use std::{fmt, str::FromStr};

/// A client-level operation on a model, or one of the raw actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    FindUnique,
    FindFirst,
    FindMany,
    Create,
    CreateMany,
    Update,
    UpdateMany,
    Upsert,
    Delete,
    DeleteMany,
    ExecuteRaw,
    QueryRaw,
    Aggregate,
    GroupBy,
    Count,
}

impl Action {
    pub const ALL: [Action; 15] = [
        Action::FindUnique,
        Action::FindFirst,
        Action::FindMany,
        Action::Create,
        Action::CreateMany,
        Action::Update,
        Action::UpdateMany,
        Action::Upsert,
        Action::Delete,
        Action::DeleteMany,
        Action::ExecuteRaw,
        Action::QueryRaw,
        Action::Aggregate,
        Action::GroupBy,
        Action::Count,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::FindUnique => "findUnique",
            Action::FindFirst => "findFirst",
            Action::FindMany => "findMany",
            Action::Create => "create",
            Action::CreateMany => "createMany",
            Action::Update => "update",
            Action::UpdateMany => "updateMany",
            Action::Upsert => "upsert",
            Action::Delete => "delete",
            Action::DeleteMany => "deleteMany",
            Action::ExecuteRaw => "executeRaw",
            Action::QueryRaw => "queryRaw",
            Action::Aggregate => "aggregate",
            Action::GroupBy => "groupBy",
            Action::Count => "count",
        }
    }

    /// The root type the action's field lives on.
    pub fn operation(self) -> RootType {
        match self {
            Action::FindUnique
            | Action::FindFirst
            | Action::FindMany
            | Action::Count
            | Action::Aggregate
            | Action::GroupBy => RootType::Query,
            _ => RootType::Mutation,
        }
    }

    pub fn is_raw(self) -> bool {
        matches!(self, Action::ExecuteRaw | Action::QueryRaw)
    }

    /// `count` runs through the model's aggregate field.
    pub(crate) fn mapping_key(self) -> &'static str {
        match self {
            Action::Count => Action::Aggregate.as_str(),
            other => other.as_str(),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| ClientError::internal(format!("Unknown action {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_are_queries_and_writes_are_mutations() {
        let queries: Vec<_> = Action::ALL
            .into_iter()
            .filter(|a| a.operation() == RootType::Query)
            .map(Action::as_str)
            .collect();

        assert_eq!(
            queries,
            ["findUnique", "findFirst", "findMany", "aggregate", "groupBy", "count"]
        );
        assert_eq!(Action::ExecuteRaw.operation(), RootType::Mutation);
        assert_eq!(Action::UpdateMany.operation(), RootType::Mutation);
    }

    #[test]
    fn names_round_trip() {
        for action in Action::ALL {
            assert_eq!(action.as_str().parse::<Action>().unwrap(), action);
        }

        assert!("findOne".parse::<Action>().is_err());
    }
}
