//! Dynamic SQL construction for the enquiries table.
//!
//! Every statement is built as a `?N`-parameterized string plus an ordered
//! list of bind values. Caller-supplied strings only ever reach a value
//! position through a bind; identifiers are interpolated exclusively from
//! the `&'static str` allow-lists below.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use crate::error::EnquiryError;
use crate::infrastructure::entities::EnquiryStatus;

/// Fields the list query may sort by.
pub const SORTABLE_FIELDS: [&str; 6] = [
    "uname",
    "email",
    "mobile",
    "created_at",
    "status",
    "submission_datetime",
];

/// Columns a partial update may touch. Anything else is rejected.
pub const UPDATABLE_FIELDS: [&str; 7] = [
    "uname",
    "email",
    "mobile",
    "contacted",
    "followup_date",
    "notes",
    "status",
];

// Stored as RFC 3339 TEXT; ordered through datetime() so comparison is
// chronological rather than lexicographic.
const DATETIME_FIELDS: [&str; 2] = ["created_at", "submission_datetime"];

pub const DEFAULT_SORT_FIELD: &str = "created_at";
pub const DEFAULT_DIRECTION: &str = "desc";

/// A value bound into a `?N` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Int(i64),
    Real(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Null,
}

/// Untrusted filter/sort/search input for the list query.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub sort: Option<String>,
    pub direction: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
}

/// Resolve a sort field against the allow-list, falling back to
/// `created_at` for anything absent or unrecognized.
pub fn resolve_sort_field(sort: Option<&str>) -> &'static str {
    sort.and_then(|s| SORTABLE_FIELDS.iter().find(|field| **field == s))
        .copied()
        .unwrap_or(DEFAULT_SORT_FIELD)
}

/// Resolve a direction against {asc, desc}, falling back to `desc`.
pub fn resolve_direction(direction: Option<&str>) -> &'static str {
    match direction {
        Some("asc") => "asc",
        Some("desc") => "desc",
        _ => DEFAULT_DIRECTION,
    }
}

/// Build the list/filter/search query.
///
/// Filters are ANDed onto `WHERE 1 = 1`; the search pattern is bound once
/// and its numbered placeholder reused across all three LIKE comparisons.
pub fn build_list_query(params: &ListParams) -> (String, Vec<SqlParam>) {
    let mut sql = String::from("SELECT * FROM enquiries WHERE 1 = 1");
    let mut binds: Vec<SqlParam> = Vec::new();

    if let Some(status) = params.status.as_deref() {
        if !status.is_empty() && status != "all" {
            sql.push_str(&format!(" AND status = ?{}", binds.len() + 1));
            binds.push(SqlParam::Text(status.to_owned()));
        }
    }

    if let Some(search) = params.search.as_deref() {
        if !search.is_empty() {
            let n = binds.len() + 1;
            sql.push_str(&format!(
                " AND (uname LIKE ?{n} OR email LIKE ?{n} OR mobile LIKE ?{n})"
            ));
            binds.push(SqlParam::Text(format!("%{search}%")));
        }
    }

    let field = resolve_sort_field(params.sort.as_deref());
    let direction = resolve_direction(params.direction.as_deref());
    if DATETIME_FIELDS.contains(&field) {
        sql.push_str(&format!(" ORDER BY datetime({field}) {direction}"));
    } else {
        sql.push_str(&format!(" ORDER BY {field} {direction}"));
    }

    (sql, binds)
}

/// Build a partial update touching exactly the supplied columns plus
/// `updated_at`.
///
/// Column names are checked against [`UPDATABLE_FIELDS`] and values are
/// checked per column before anything is interpolated; unknown keys and
/// malformed values fail with `Validation`.
pub fn build_patch_update(
    id: i64,
    fields: &serde_json::Map<String, Value>,
    now: DateTime<Utc>,
) -> Result<(String, Vec<SqlParam>), EnquiryError> {
    if fields.is_empty() {
        return Err(EnquiryError::validation("No fields provided for update"));
    }

    let mut assignments: Vec<String> = Vec::with_capacity(fields.len());
    let mut binds: Vec<SqlParam> = Vec::with_capacity(fields.len() + 2);

    for (key, value) in fields {
        let column = UPDATABLE_FIELDS
            .iter()
            .find(|field| **field == key.as_str())
            .copied()
            .ok_or_else(|| {
                EnquiryError::Validation(format!("Unknown field for update: {key}"))
            })?;

        binds.push(patch_value(column, value)?);
        assignments.push(format!("{} = ?{}", column, binds.len()));
    }

    binds.push(SqlParam::Timestamp(now));
    let updated_at_n = binds.len();
    binds.push(SqlParam::Int(id));
    let id_n = binds.len();

    let sql = format!(
        "UPDATE enquiries SET {}, updated_at = ?{} WHERE id = ?{} RETURNING *",
        assignments.join(", "),
        updated_at_n,
        id_n,
    );

    Ok((sql, binds))
}

/// Validate one patch value against the column it targets.
fn patch_value(column: &'static str, value: &Value) -> Result<SqlParam, EnquiryError> {
    match column {
        "uname" | "email" | "mobile" => match value {
            Value::String(s) if !s.trim().is_empty() => Ok(SqlParam::Text(s.clone())),
            _ => Err(EnquiryError::Validation(format!(
                "Field '{column}' must be a non-empty string"
            ))),
        },
        "contacted" => match value {
            Value::Bool(b) => Ok(SqlParam::Bool(*b)),
            _ => Err(EnquiryError::validation("Field 'contacted' must be a boolean")),
        },
        "status" => {
            let status: EnquiryStatus = serde_json::from_value(value.clone())
                .map_err(|_| EnquiryError::validation("Invalid status value"))?;
            // round-trip through serde to get the canonical snake_case token
            match serde_json::to_value(status) {
                Ok(Value::String(s)) => Ok(SqlParam::Text(s)),
                _ => Err(EnquiryError::validation("Invalid status value")),
            }
        }
        "followup_date" => match value {
            Value::Null => Ok(SqlParam::Null),
            Value::String(s) => {
                let date: NaiveDate = s.parse().map_err(|_| {
                    EnquiryError::validation(
                        "Field 'followup_date' must be a YYYY-MM-DD date or null",
                    )
                })?;
                Ok(SqlParam::Text(date.to_string()))
            }
            _ => Err(EnquiryError::validation(
                "Field 'followup_date' must be a YYYY-MM-DD date or null",
            )),
        },
        "notes" => match value {
            Value::Null => Ok(SqlParam::Null),
            Value::String(s) => Ok(SqlParam::Text(s.clone())),
            _ => Err(EnquiryError::validation("Field 'notes' must be a string or null")),
        },
        _ => unreachable!("column gated by UPDATABLE_FIELDS"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(
        sort: Option<&str>,
        direction: Option<&str>,
        status: Option<&str>,
        search: Option<&str>,
    ) -> ListParams {
        ListParams {
            sort: sort.map(String::from),
            direction: direction.map(String::from),
            status: status.map(String::from),
            search: search.map(String::from),
        }
    }

    #[test]
    fn unknown_sort_field_falls_back_to_created_at() {
        assert_eq!(resolve_sort_field(Some("id; DROP TABLE enquiries")), "created_at");
        assert_eq!(resolve_sort_field(Some("notes")), "created_at");
        assert_eq!(resolve_sort_field(None), "created_at");
        assert_eq!(resolve_sort_field(Some("email")), "email");
    }

    #[test]
    fn unknown_direction_falls_back_to_desc() {
        assert_eq!(resolve_direction(Some("ASC; --")), "desc");
        assert_eq!(resolve_direction(None), "desc");
        assert_eq!(resolve_direction(Some("asc")), "asc");
    }

    #[test]
    fn bare_list_query_orders_by_created_at_desc() {
        let (sql, binds) = build_list_query(&ListParams::default());
        assert_eq!(
            sql,
            "SELECT * FROM enquiries WHERE 1 = 1 ORDER BY datetime(created_at) desc"
        );
        assert!(binds.is_empty());
    }

    #[test]
    fn status_all_is_not_a_filter() {
        let (sql, binds) = build_list_query(&params(None, None, Some("all"), None));
        assert!(!sql.contains("status ="));
        assert!(binds.is_empty());
    }

    #[test]
    fn status_filter_is_bound_not_interpolated() {
        let (sql, binds) = build_list_query(&params(None, None, Some("contacted"), None));
        assert!(sql.contains(" AND status = ?1"));
        assert_eq!(binds, vec![SqlParam::Text("contacted".to_owned())]);
    }

    #[test]
    fn search_binds_one_wildcard_pattern_reused_three_times() {
        let (sql, binds) = build_list_query(&params(None, None, None, Some("alice")));
        assert!(sql.contains("(uname LIKE ?1 OR email LIKE ?1 OR mobile LIKE ?1)"));
        assert_eq!(binds, vec![SqlParam::Text("%alice%".to_owned())]);
    }

    #[test]
    fn status_and_search_compose_with_and() {
        let (sql, binds) =
            build_list_query(&params(Some("uname"), Some("asc"), Some("new"), Some("a@x")));
        assert!(sql.contains(" AND status = ?1 AND (uname LIKE ?2 OR email LIKE ?2 OR mobile LIKE ?2)"));
        assert!(sql.ends_with("ORDER BY uname asc"));
        assert_eq!(
            binds,
            vec![
                SqlParam::Text("new".to_owned()),
                SqlParam::Text("%a@x%".to_owned()),
            ]
        );
    }

    #[test]
    fn empty_patch_is_rejected() {
        let err = build_patch_update(1, &serde_json::Map::new(), Utc::now()).unwrap_err();
        match err {
            EnquiryError::Validation(message) => {
                assert_eq!(message, "No fields provided for update")
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_patch_column_is_rejected() {
        let fields = json!({"id": 99}).as_object().cloned().unwrap();
        assert!(matches!(
            build_patch_update(1, &fields, Utc::now()),
            Err(EnquiryError::Validation(_))
        ));

        let fields = json!({"uname = '' WHERE 1=1; --": "x"})
            .as_object()
            .cloned()
            .unwrap();
        assert!(matches!(
            build_patch_update(1, &fields, Utc::now()),
            Err(EnquiryError::Validation(_))
        ));
    }

    #[test]
    fn patch_covers_exactly_the_supplied_columns_plus_updated_at() {
        let fields = json!({"contacted": true, "status": "interested"})
            .as_object()
            .cloned()
            .unwrap();
        let now = Utc::now();
        let (sql, binds) = build_patch_update(42, &fields, now).unwrap();

        assert_eq!(
            sql,
            "UPDATE enquiries SET contacted = ?1, status = ?2, updated_at = ?3 \
             WHERE id = ?4 RETURNING *"
        );
        assert_eq!(
            binds,
            vec![
                SqlParam::Bool(true),
                SqlParam::Text("interested".to_owned()),
                SqlParam::Timestamp(now),
                SqlParam::Int(42),
            ]
        );
    }

    #[test]
    fn patch_rejects_invalid_status_value() {
        let fields = json!({"status": "spam"}).as_object().cloned().unwrap();
        assert!(matches!(
            build_patch_update(1, &fields, Utc::now()),
            Err(EnquiryError::Validation(_))
        ));
    }

    #[test]
    fn patch_rejects_empty_required_string() {
        let fields = json!({"uname": "  "}).as_object().cloned().unwrap();
        assert!(matches!(
            build_patch_update(1, &fields, Utc::now()),
            Err(EnquiryError::Validation(_))
        ));
    }

    #[test]
    fn patch_accepts_clearing_optional_columns() {
        let fields = json!({"notes": null, "followup_date": null})
            .as_object()
            .cloned()
            .unwrap();
        let (_, binds) = build_patch_update(7, &fields, Utc::now()).unwrap();
        assert_eq!(binds[0], SqlParam::Null);
        assert_eq!(binds[1], SqlParam::Null);
    }

    #[test]
    fn patch_rejects_malformed_followup_date() {
        let fields = json!({"followup_date": "next tuesday"})
            .as_object()
            .cloned()
            .unwrap();
        assert!(matches!(
            build_patch_update(1, &fields, Utc::now()),
            Err(EnquiryError::Validation(_))
        ));
    }
}
