/// A horizontal filter on a PostgREST table, rendered as `column=op.value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Eq(String, String),
    Neq(String, String),
    IsNull(String),
    NotNull(String),
    In(String, Vec<String>),
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl ToString) -> Self {
        Self::Eq(column.into(), value.to_string())
    }

    pub fn neq(column: impl Into<String>, value: impl ToString) -> Self {
        Self::Neq(column.into(), value.to_string())
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Self::IsNull(column.into())
    }

    pub fn not_null(column: impl Into<String>) -> Self {
        Self::NotNull(column.into())
    }

    pub fn in_list<I, V>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        Self::In(
            column.into(),
            values.into_iter().map(|v| v.to_string()).collect(),
        )
    }

    pub fn column(&self) -> &str {
        match self {
            Self::Eq(c, _) | Self::Neq(c, _) | Self::IsNull(c) | Self::NotNull(c) => c,
            Self::In(c, _) => c,
        }
    }

    pub fn as_query_pair(&self) -> (String, String) {
        let expression = match self {
            Self::Eq(_, v) => format!("eq.{}", v),
            Self::Neq(_, v) => format!("neq.{}", v),
            Self::IsNull(_) => "is.null".to_string(),
            Self::NotNull(_) => "not.is.null".to_string(),
            Self::In(_, values) => format!("in.({})", values.join(",")),
        };
        (self.column().to_string(), expression)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

impl Order {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }

    pub fn as_query_value(&self) -> String {
        let direction = if self.ascending { "asc" } else { "desc" };
        format!("{}.{}", self.column, direction)
    }
}
