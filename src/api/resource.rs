//! CRUD handlers shared by every resource, parameterized by a `Resource`
//! descriptor and the `Store` behind it.

use std::marker::PhantomData;

use actix_web::{FromRequest, HttpMessage, HttpRequest, HttpResponse, dev::Payload, web};
use futures::future::LocalBoxFuture;
use serde_json::{Map, Value, json};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::model::{Resource, UpdateField};
use crate::store::{Store, StoreError};
use crate::utils::db_utils::{Insert, PartialUpdate, ProcedureCall, SqlValue};

/// Fetches the row addressed by a raw route parameter.
///
/// A parameter that does not parse as the key type cannot match a row and is
/// reported the same way as a missing row.
pub async fn load<R: Resource, S: Store>(store: &S, raw_key: &str) -> Result<R::Row, ApiError> {
    let not_found = || ApiError::NotFound(format!("{} not found", R::TITLE));

    let key: R::Key = raw_key.parse().map_err(|_| not_found())?;
    debug!(resource = R::NOUN, key = %key, "Loading row");

    store
        .select_one::<R::Row>(&R::by_key(), &key.into())
        .await
        .map_err(|e| ApiError::storage(&format!("Could not retrieve {}", R::NOUN), e))?
        .ok_or_else(not_found)
}

/// Row named by the `R::PARAM` route segment, loaded before the handler runs.
///
/// The row is also stored in request extensions for later middleware.
pub struct Loaded<R: Resource, S: Store> {
    pub row: R::Row,
    _store: PhantomData<fn() -> S>,
}

impl<R: Resource, S: Store> FromRequest for Loaded<R, S> {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let store = req
                .app_data::<web::Data<S>>()
                .cloned()
                .ok_or_else(|| ApiError::Internal("Store is not configured".to_string()))?;
            let raw = req.match_info().get(R::PARAM).unwrap_or_default().to_string();

            let row = load::<R, S>(store.get_ref(), &raw).await?;
            req.extensions_mut().insert(row.clone());

            Ok(Loaded {
                row,
                _store: PhantomData,
            })
        })
    }
}

/// Reads the allow-listed fields present in `body`, in declaration order.
///
/// Absent and null keys are skipped. Keys are the column names; the
/// upper-case spelling the listing screens echo back is accepted too.
pub fn collect_changes<F: UpdateField>(body: &Map<String, Value>) -> Result<Vec<(F, SqlValue)>, ApiError> {
    let mut picked = Vec::new();

    for field in F::iter() {
        let column = field.column();
        let value = body
            .get(column)
            .or_else(|| body.get(&column.to_uppercase()));

        match value {
            None | Some(Value::Null) => continue,
            Some(value) => {
                let bound = field.kind().convert(value).ok_or_else(|| {
                    ApiError::Validation(format!("Invalid value for field '{}'.", column))
                })?;
                picked.push((field, bound));
            }
        }
    }

    Ok(picked)
}

pub fn no_fields() -> ApiError {
    ApiError::Validation("No valid fields provided for update.".to_string())
}

/// Runs the update and returns the canonical row as stored afterwards.
pub async fn apply_update<R: Resource, S: Store>(
    store: &S,
    update: PartialUpdate,
) -> Result<R::Row, ApiError> {
    let context = format!("Could not update {}", R::NOUN);

    let affected = store
        .update(&update)
        .await
        .map_err(|e| ApiError::storage(&context, e))?;
    debug!(resource = R::NOUN, affected, "Update applied");

    store
        .select_one::<R::Row>(&R::by_key(), &update.key)
        .await
        .map_err(|e| ApiError::storage(&context, e))?
        .ok_or_else(|| ApiError::NotFound(format!("{} not found", R::TITLE)))
}

/// Inserts a new row, through `procedure` when one is given.
pub async fn persist_new<S: Store>(
    store: &S,
    insert: Insert,
    procedure: Option<&'static str>,
) -> Result<u64, StoreError> {
    match procedure {
        Some(name) => {
            let call = insert
                .values
                .into_iter()
                .fold(ProcedureCall::new(name), |call, (column, value)| {
                    call.arg(column, value)
                });
            store.call(&call).await.map(|_| 0)
        }
        None => store.insert(&insert).await,
    }
}

pub fn created<R: Resource>(key: impl Into<Value>) -> HttpResponse {
    let mut body = Map::new();
    body.insert(
        "message".to_string(),
        Value::from(format!("{} created successfully.", R::TITLE)),
    );
    body.insert(R::PRIMARY_KEY.to_string(), key.into());
    HttpResponse::Created().json(body)
}

pub async fn list<R: Resource, S: Store>(store: web::Data<S>) -> Result<HttpResponse, ApiError> {
    let rows = store
        .select_all::<R::Row>(&R::listing())
        .await
        .map_err(|e| ApiError::storage(&format!("Could not list {}s", R::NOUN), e))?;

    Ok(HttpResponse::Ok().json(rows))
}

pub async fn read<R: Resource, S: Store>(loaded: Loaded<R, S>) -> HttpResponse {
    HttpResponse::Ok().json(loaded.row)
}

pub async fn update<R: Resource, S: Store>(
    store: web::Data<S>,
    loaded: Loaded<R, S>,
    body: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, ApiError> {
    let mut update = PartialUpdate::new(R::TABLE, R::PRIMARY_KEY, R::key(&loaded.row));
    for (field, value) in collect_changes::<R::Field>(&body)? {
        update.set(field.column(), value);
    }
    if !update.has_changes() {
        return Err(no_fields());
    }

    let row = apply_update::<R, S>(store.get_ref(), update).await?;
    Ok(HttpResponse::Ok().json(row))
}

/// Deletes one row by key; zero rows affected reads as not found.
pub async fn delete_row<R: Resource, S: Store>(store: &S, key: R::Key) -> Result<HttpResponse, ApiError> {
    let affected = store
        .delete(R::TABLE, R::PRIMARY_KEY, &key.clone().into())
        .await
        .map_err(|e| ApiError::storage(&format!("Could not delete {}", R::NOUN), e))?;

    if affected == 0 {
        return Err(ApiError::NotFound(format!(
            "{} not found for deletion.",
            R::TITLE
        )));
    }

    info!(resource = R::NOUN, key = %key, "Row deleted");
    Ok(HttpResponse::Ok().json(json!({
        "message": format!("{} {} successfully deleted.", R::TITLE, key)
    })))
}

pub async fn remove<R: Resource, S: Store>(
    store: web::Data<S>,
    loaded: Loaded<R, S>,
) -> Result<HttpResponse, ApiError> {
    delete_row::<R, S>(store.get_ref(), R::key(&loaded.row)).await
}

pub async fn remove_all<R: Resource, S: Store>(
    store: web::Data<S>,
) -> Result<HttpResponse, ApiError> {
    let affected = store
        .delete_all(R::TABLE)
        .await
        .map_err(|e| ApiError::storage(&format!("Could not delete {}s", R::NOUN), e))?;

    info!(resource = R::NOUN, affected, "Table cleared");
    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Successfully deleted {} {}(s).", affected, R::NOUN)
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::employee::EmployeeField;
    use crate::model::job::{JobField, Jobs};
    use crate::store::memory::MemoryStore;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn only_allow_listed_non_null_fields_are_picked() {
        let body = object(json!({
            "job_id": "HACKED",
            "job_title": "Senior Programmer",
            "min_salary": null,
            "unknown": 1
        }));

        let picked = collect_changes::<JobField>(&body).unwrap();
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].0.column(), "job_title");
        assert_eq!(picked[0].1, SqlValue::String("Senior Programmer".into()));
    }

    #[test]
    fn upper_case_keys_are_accepted() {
        let body = object(json!({ "EMAIL": "SKING", "SALARY": "24000" }));
        let picked = collect_changes::<EmployeeField>(&body).unwrap();

        let columns: Vec<_> = picked.iter().map(|(f, _)| f.column()).collect();
        assert_eq!(columns, vec!["email", "salary"]);
        assert_eq!(picked[1].1, SqlValue::F64(24000.0));
    }

    #[test]
    fn mistyped_values_are_rejected() {
        let body = object(json!({ "manager_id": "not-a-number" }));
        let err = collect_changes::<EmployeeField>(&body).unwrap_err();
        assert!(err.to_string().contains("manager_id"));
    }

    #[test]
    fn empty_body_picks_nothing() {
        assert!(collect_changes::<JobField>(&Map::new()).unwrap().is_empty());
    }

    #[actix_web::test]
    async fn procedure_creation_passes_every_column() {
        let store = MemoryStore::new();
        let insert = Insert::into_table(Jobs::TABLE)
            .value("job_id", "AC_MGR")
            .value("job_title", "Accounting Manager")
            .value("min_salary", 8200.0)
            .value("max_salary", None::<f64>);

        let key = persist_new(&store, insert, Some("sp_new_job")).await.unwrap();
        assert_eq!(key, 0);

        let row = store
            .raw_row(Jobs::TABLE, "job_id", &SqlValue::from("AC_MGR"))
            .unwrap();
        assert_eq!(row["job_title"], json!("Accounting Manager"));
        assert_eq!(row["min_salary"], json!(8200.0));
        assert!(row["max_salary"].is_null());
    }
}
