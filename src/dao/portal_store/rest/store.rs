use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use uuid::Uuid;

use crate::dao::{
    models::{
        AttemptEntity, IdeaEntity, IdeaPointEvent, NewAttempt, NewUser, QuizEntity, UserEntity,
        UserRole,
    },
    portal_store::PortalStore,
    storage::StorageResult,
};

use super::{
    config::RestConfig,
    error::{RestDaoError, RestResult},
    models::{
        CreateUserBody, NewAttemptBody, RawAttemptRow, RawIdeaPointRow, RawIdeaRow, RawQuizRow,
        RawUserRow, UpdatePointsBody, VerifyPasswordBody, role_wire_name,
    },
};

/// Embedded select clause pulling quizzes together with their questions.
const QUIZ_SELECT: &str = "*,quiz_questions(*)";

/// [`PortalStore`] implementation backed by a hosted PostgREST-style API.
#[derive(Clone)]
pub struct RestPortalStore {
    client: Client,
    base_url: Arc<str>,
    api_key: Option<Arc<str>>,
}

impl RestPortalStore {
    /// Build the HTTP client and verify the backend answers before returning.
    pub async fn connect(config: RestConfig) -> RestResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| RestDaoError::ClientBuilder { source })?;

        let base_url = Arc::<str>::from(config.base_url.trim_end_matches('/'));
        let api_key = config.api_key.map(Arc::<str>::from);

        let store = Self {
            client,
            base_url,
            api_key,
        };

        store.ping().await?;
        Ok(store)
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/rest/v1/{}", self.base_url, path);
        let mut builder = self.client.request(method, url);
        if let Some(ref key) = self.api_key {
            builder = builder
                .header("apikey", key.as_ref())
                .bearer_auth(key.as_ref());
        }
        builder
    }

    /// Probe the API root; any successful status counts as reachable.
    async fn ping(&self) -> RestResult<()> {
        let response = self
            .request(Method::GET, "")
            .send()
            .await
            .map_err(|source| RestDaoError::RequestSend {
                path: String::new(),
                source,
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(RestDaoError::RequestStatus {
                path: String::new(),
                status: response.status(),
            })
        }
    }

    async fn fetch_rows<T>(&self, path: &str, query: &[(&str, String)]) -> RestResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::GET, path)
            .query(query)
            .send()
            .await
            .map_err(|source| RestDaoError::RequestSend {
                path: path.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(RestDaoError::RequestStatus {
                path: path.to_string(),
                status: response.status(),
            });
        }

        response
            .json::<Vec<T>>()
            .await
            .map_err(|source| RestDaoError::DecodeResponse {
                path: path.to_string(),
                source,
            })
    }

    /// POST or PATCH a row and decode the single returned representation.
    async fn write_row<B, T>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: &B,
    ) -> RestResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let response = self
            .request(method, path)
            .query(query)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await
            .map_err(|source| RestDaoError::RequestSend {
                path: path.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(RestDaoError::RequestStatus {
                path: path.to_string(),
                status: response.status(),
            });
        }

        let mut rows =
            response
                .json::<Vec<T>>()
                .await
                .map_err(|source| RestDaoError::DecodeResponse {
                    path: path.to_string(),
                    source,
                })?;

        rows.pop().ok_or(RestDaoError::EmptyResponse {
            path: path.to_string(),
        })
    }

    /// Invoke a backend RPC function, decoding the JSON result.
    async fn call_rpc<B, T>(&self, function: &str, body: &B) -> RestResult<(StatusCode, Option<T>)>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let path = format!("rpc/{function}");
        let response = self
            .request(Method::POST, &path)
            .json(body)
            .send()
            .await
            .map_err(|source| RestDaoError::RequestSend {
                path: path.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Ok((status, None));
        }

        // RPC results arrive as a bare object, a one-element array, or null
        // depending on how the function is declared; fold all three.
        let payload = response.json::<serde_json::Value>().await.map_err(|source| {
            RestDaoError::DecodeResponse {
                path: path.clone(),
                source,
            }
        })?;
        let row = match payload {
            serde_json::Value::Null => None,
            serde_json::Value::Array(rows) => rows.into_iter().next(),
            other => Some(other),
        };
        let decoded = row
            .map(serde_json::from_value::<T>)
            .transpose()
            .map_err(|source| RestDaoError::DecodeJson {
                path: path.clone(),
                source,
            })?;

        Ok((status, decoded))
    }
}

impl PortalStore for RestPortalStore {
    fn fetch_quizzes(&self) -> BoxFuture<'static, StorageResult<Vec<QuizEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let rows = store
                .fetch_rows::<RawQuizRow>(
                    "quizzes",
                    &[
                        ("select", QUIZ_SELECT.to_string()),
                        ("order", "created_at.desc".to_string()),
                    ],
                )
                .await?;
            Ok(rows.into_iter().map(Into::into).collect())
        })
    }

    fn fetch_quiz(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<QuizEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let rows = store
                .fetch_rows::<RawQuizRow>(
                    "quizzes",
                    &[
                        ("select", QUIZ_SELECT.to_string()),
                        ("id", format!("eq.{id}")),
                    ],
                )
                .await?;
            Ok(rows.into_iter().next().map(Into::into))
        })
    }

    fn fetch_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let rows = store
                .fetch_rows::<RawUserRow>("users", &[("id", format!("eq.{id}"))])
                .await?;
            Ok(rows.into_iter().next().map(Into::into))
        })
    }

    fn fetch_ranking(&self, limit: usize) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let rows = store
                .fetch_rows::<RawUserRow>(
                    "users",
                    &[
                        ("order", "points.desc".to_string()),
                        ("limit", limit.to_string()),
                    ],
                )
                .await?;
            Ok(rows.into_iter().map(Into::into).collect())
        })
    }

    fn fetch_attempts_by_user(
        &self,
        user_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<AttemptEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let rows = store
                .fetch_rows::<RawAttemptRow>(
                    "quiz_attempts",
                    &[
                        ("user_id", format!("eq.{user_id}")),
                        ("order", "completed_at.desc".to_string()),
                    ],
                )
                .await?;
            Ok(rows.into_iter().map(Into::into).collect())
        })
    }

    fn fetch_ideas_by_user(
        &self,
        user_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<IdeaEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let rows = store
                .fetch_rows::<RawIdeaRow>("ideas", &[("user_id", format!("eq.{user_id}"))])
                .await?;
            Ok(rows.into_iter().map(Into::into).collect())
        })
    }

    fn fetch_ideas_since(
        &self,
        days: u32,
    ) -> BoxFuture<'static, StorageResult<Vec<IdeaPointEvent>>> {
        let store = self.clone();
        Box::pin(async move {
            let cutoff = OffsetDateTime::now_utc() - time::Duration::days(i64::from(days));
            let cutoff = cutoff
                .format(&Rfc3339)
                .map_err(|source| RestDaoError::CutoffFormat { source })?;

            let rows = store
                .fetch_rows::<RawIdeaPointRow>(
                    "ideas",
                    &[
                        ("select", "user_id,points_awarded,created_at".to_string()),
                        ("created_at", format!("gte.{cutoff}")),
                    ],
                )
                .await?;
            Ok(rows.into_iter().map(Into::into).collect())
        })
    }

    fn create_attempt(
        &self,
        attempt: NewAttempt,
    ) -> BoxFuture<'static, StorageResult<AttemptEntity>> {
        let store = self.clone();
        Box::pin(async move {
            let body = NewAttemptBody {
                user_id: attempt.user_id,
                quiz_id: attempt.quiz_id,
                score: attempt.score,
                answers: attempt.answers,
            };
            let row = store
                .write_row::<_, RawAttemptRow>(Method::POST, "quiz_attempts", &[], &body)
                .await?;
            Ok(row.into())
        })
    }

    fn update_user_points(
        &self,
        user_id: Uuid,
        new_total: i64,
    ) -> BoxFuture<'static, StorageResult<UserEntity>> {
        let store = self.clone();
        Box::pin(async move {
            let body = UpdatePointsBody { points: new_total };
            let row = store
                .write_row::<_, RawUserRow>(
                    Method::PATCH,
                    "users",
                    &[("id", format!("eq.{user_id}"))],
                    &body,
                )
                .await?;
            Ok(row.into())
        })
    }

    fn verify_password(
        &self,
        email: String,
        password: String,
    ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let body = VerifyPasswordBody {
                p_email: email,
                p_password: password,
            };
            // The RPC signals rejected credentials with an error status; that
            // is a normal outcome, not an outage.
            let (_, row) = store
                .call_rpc::<_, RawUserRow>("verify_user_password", &body)
                .await?;
            Ok(row.map(Into::into))
        })
    }

    fn register_user(
        &self,
        registration: NewUser,
    ) -> BoxFuture<'static, StorageResult<UserEntity>> {
        let store = self.clone();
        Box::pin(async move {
            let body = CreateUserBody {
                p_email: registration.email,
                p_password: registration.password,
                p_full_name: registration.full_name,
                p_department: registration.department,
                p_role: role_wire_name(registration.role.unwrap_or(UserRole::Collaborator))
                    .to_string(),
            };
            let (status, row) = store
                .call_rpc::<_, RawUserRow>("create_user_with_password", &body)
                .await?;

            match row {
                Some(row) => Ok(row.into()),
                None => Err(RestDaoError::RequestStatus {
                    path: "rpc/create_user_with_password".to_string(),
                    status,
                }
                .into()),
            }
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }
}
