use std::fmt::{self, Display};
use std::time::Instant;

use serde_json::Value;

use crate::error::Error;
use crate::http::context::RequestContext;
use crate::http::method::HttpMethod;
use crate::http::response::ResponseEnvelope;

use super::payload::MutationPayload;
use super::report::{CheckRecord, RunReport};

/// The collection-style read endpoints the backend serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Posts,
    Comments,
    Albums,
    Photos,
    Todos,
    Users,
}

impl Collection {
    pub const ALL: [Collection; 6] = [
        Collection::Posts,
        Collection::Comments,
        Collection::Albums,
        Collection::Photos,
        Collection::Todos,
        Collection::Users,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Collection::Posts => "/posts",
            Collection::Comments => "/comments",
            Collection::Albums => "/albums",
            Collection::Photos => "/photos",
            Collection::Todos => "/todos",
            Collection::Users => "/users",
        }
    }

    fn resource(self, id: u64) -> String {
        format!("{}/{id}", self.path())
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// One verification session: wraps a [`RequestContext`] for the duration of
/// a test case and runs the verb-specific assertion protocol against it.
///
/// The four mutation checks share a pattern (mutate, then re-read and prove
/// the mutation did NOT take effect) but the delete check has inverse
/// polarity: the resource must STILL be retrievable afterwards. The context
/// is released when the session drops, on every exit path.
#[derive(Debug)]
pub struct VerificationSession {
    context: RequestContext,
    records: Vec<CheckRecord>,
}

impl VerificationSession {
    pub fn new(context: RequestContext) -> Self {
        Self {
            context,
            records: Vec::new(),
        }
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    /// Summary of every check run so far in this session.
    pub fn report(&self) -> RunReport {
        RunReport::from_records(self.records.clone())
    }

    /// GET the collection and assert a 2xx status with a non-null parsed
    /// body.
    pub async fn check_collection(&mut self, collection: Collection) -> Result<(), Error> {
        let path = collection.path();
        let started = Instant::now();
        let result = read_collection(&self.context, path).await;
        self.record(path, HttpMethod::Get, started, result)
    }

    /// POST the payload to the collection, assert the immediate response
    /// looks successful, then prove nothing was stored: the resource one
    /// past the current collection size must NOT be retrievable.
    ///
    /// The probe id is pinned against a snapshot of the collection size
    /// taken at the start of the check, so drift in a live backend between
    /// runs does not break the assumption.
    pub async fn verify_create(
        &mut self,
        collection: Collection,
        payload: MutationPayload,
    ) -> Result<(), Error> {
        let path = collection.path();
        let started = Instant::now();
        let result = create_then_probe(&self.context, collection, &payload).await;
        self.record(path, HttpMethod::Post, started, result)
    }

    /// PUT a full payload to the resource, assert the immediate response
    /// looks successful, then prove the replace did not persist: a fresh
    /// read of the same id must be deep-unequal to the PUT response body.
    pub async fn verify_replace(
        &mut self,
        collection: Collection,
        id: u64,
        payload: MutationPayload,
    ) -> Result<(), Error> {
        let resource = collection.resource(id);
        let started = Instant::now();
        let result = replace_then_reread(&self.context, &resource, &payload).await;
        self.record(&resource, HttpMethod::Put, started, result)
    }

    /// PATCH a partial payload to the resource, assert the echo reflects
    /// every submitted string value verbatim, then prove the update did not
    /// persist via the same deep-inequality re-read as the replace check.
    pub async fn verify_partial_update(
        &mut self,
        collection: Collection,
        id: u64,
        payload: MutationPayload,
    ) -> Result<(), Error> {
        let resource = collection.resource(id);
        let started = Instant::now();
        let result = patch_then_reread(&self.context, &resource, &payload).await;
        self.record(&resource, HttpMethod::Patch, started, result)
    }

    /// DELETE the resource, assert the immediate response looks successful,
    /// then prove nothing was removed: a fresh GET of the same id must
    /// still succeed. Inverse polarity from the other mutation checks.
    pub async fn verify_delete(&mut self, collection: Collection, id: u64) -> Result<(), Error> {
        let resource = collection.resource(id);
        let started = Instant::now();
        let result = delete_then_reread(&self.context, &resource).await;
        self.record(&resource, HttpMethod::Delete, started, result)
    }

    fn record(
        &mut self,
        endpoint: &str,
        method: HttpMethod,
        started: Instant,
        result: Result<(), Error>,
    ) -> Result<(), Error> {
        let passed = result.is_ok();
        self.records.push(CheckRecord {
            endpoint: endpoint.to_string(),
            method,
            passed,
            duration_ms: started.elapsed().as_millis(),
        });

        match &result {
            Ok(()) => tracing::info!(endpoint, %method, "verification passed"),
            Err(e) => tracing::warn!(endpoint, %method, error = %e, "verification failed"),
        }
        result
    }
}

async fn read_collection(context: &RequestContext, path: &str) -> Result<(), Error> {
    let response = context.get(path).await?;
    expect_success(path, &response)?;
    expect_body(path, &response)?;
    Ok(())
}

async fn create_then_probe(
    context: &RequestContext,
    collection: Collection,
    payload: &MutationPayload,
) -> Result<(), Error> {
    let path = collection.path();

    // Snapshot the collection size before mutating; the probe id is one
    // past the last allocated slot.
    let listing = context.get(path).await?;
    expect_success(path, &listing)?;
    let size = match expect_body(path, &listing)? {
        Value::Array(items) => items.len() as u64,
        other => {
            return Err(Error::assertion(
                path,
                format!("expected a JSON array listing, got {other}"),
            ));
        }
    };

    let created = context.post(path, payload).await?;
    expect_success(path, &created)?;
    expect_body(path, &created)?;

    let probe = collection.resource(size + 1);
    let read_back = context.get(&probe).await?;
    if read_back.is_success() {
        return Err(Error::assertion(
            &probe,
            format!(
                "expected non-success for the unallocated id, got {} (the created resource was stored server-side)",
                read_back.status_label()
            ),
        ));
    }
    Ok(())
}

async fn replace_then_reread(
    context: &RequestContext,
    resource: &str,
    payload: &MutationPayload,
) -> Result<(), Error> {
    let replaced = context.put(resource, payload).await?;
    expect_success(resource, &replaced)?;
    let replaced_body = expect_body(resource, &replaced)?.clone();

    expect_unequal_reread(context, resource, &replaced_body, "PUT").await
}

async fn patch_then_reread(
    context: &RequestContext,
    resource: &str,
    payload: &MutationPayload,
) -> Result<(), Error> {
    let patched = context.patch(resource, payload).await?;
    expect_success(resource, &patched)?;
    let patched_body = expect_body(resource, &patched)?.clone();

    for value in payload.string_values() {
        if !patched.raw.contains(value) {
            return Err(Error::assertion(
                resource,
                format!("PATCH response body does not contain the submitted value `{value}`"),
            ));
        }
    }

    expect_unequal_reread(context, resource, &patched_body, "PATCH").await
}

async fn delete_then_reread(context: &RequestContext, resource: &str) -> Result<(), Error> {
    let deleted = context.delete(resource).await?;
    expect_success(resource, &deleted)?;
    expect_body(resource, &deleted)?;

    let read_back = context.get(resource).await?;
    if !read_back.is_success() {
        return Err(Error::assertion(
            resource,
            format!(
                "expected the resource to remain retrievable after DELETE, got {} (the delete was stored server-side)",
                read_back.status_label()
            ),
        ));
    }
    Ok(())
}

/// Re-read the resource and assert its body is deep-unequal to the body the
/// write echoed back. Equality means the write persisted.
async fn expect_unequal_reread(
    context: &RequestContext,
    resource: &str,
    written_body: &Value,
    verb: &str,
) -> Result<(), Error> {
    let read_back = context.get(resource).await?;
    expect_success(resource, &read_back)?;
    let read_body = expect_body(resource, &read_back)?;

    if read_body == written_body {
        return Err(Error::assertion(
            resource,
            format!("read-back body equals the {verb} response body (the write was stored server-side)"),
        ));
    }
    Ok(())
}

fn expect_success(endpoint: &str, response: &ResponseEnvelope) -> Result<(), Error> {
    if !response.is_success() {
        return Err(Error::assertion(
            endpoint,
            format!("expected 2xx, got {}", response.status_label()),
        ));
    }
    Ok(())
}

fn expect_body<'a>(endpoint: &str, response: &'a ResponseEnvelope) -> Result<&'a Value, Error> {
    response.body.as_ref().ok_or_else(|| {
        Error::assertion(
            endpoint,
            format!("expected a non-null JSON body, got `{}`", response.raw),
        )
    })
}
