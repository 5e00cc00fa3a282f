//! REST implementation of the control-plane client traits.

use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, LOCATION};
use http::{HeaderValue, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use super::error::is_scope_not_found_code;
use super::model::{
    CloudError, CloudErrorBody, InstanceIds, NetworkInterface, OperationStatusBody,
    PublicIpAddress, VirtualMachine, VirtualMachineScaleSet,
};
use super::{
    ArmError, ArmScope, HttpClient, HttpRequest, HttpResponse, NetworkInterfaces,
    PublicIpAddresses, ResourceKind, ScaleSets, TokenCredential, VirtualMachines,
};
use crate::lro::{NoContent, Operation, OperationPoller, PollMode, PollStatus, PollTarget};

/// Header carrying the status URL of an asynchronous operation.
const ASYNC_OPERATION: &str = "azure-asyncoperation";

/// `$expand` value used when reading virtual machines.
const VM_EXPAND: &str = "instanceView";

/// Scale-set action that brings instances up to the latest model.
const MANUAL_UPGRADE: &str = "manualupgrade";

const JSON: &str = "application/json";

/// Azure Resource Manager client bound to one subscription and resource group.
///
/// Implements [`PublicIpAddresses`], [`NetworkInterfaces`], [`VirtualMachines`],
/// [`ScaleSets`] and [`OperationPoller`], and therefore
/// [`ControlPlane`](super::ControlPlane).
///
/// # Type Parameters
///
/// - `H`: The HTTP client implementation
/// - `C`: The bearer token source
///
/// # Example
///
/// ```no_run
/// use node_pip::arm::{AccessToken, ArmClient, ArmScope, ReqwestClient, StaticTokenCredential};
///
/// let client = ArmClient::new(
///     ReqwestClient::new(),
///     StaticTokenCredential::new(AccessToken::new("token")),
///     ArmScope::new("subscription", "resource-group", "westeurope"),
/// );
/// ```
#[derive(Debug, Clone)]
pub struct ArmClient<H, C> {
    http: H,
    credential: C,
    scope: ArmScope,
}

impl<H, C> ArmClient<H, C> {
    /// Creates a client for `scope`.
    #[must_use]
    pub const fn new(http: H, credential: C, scope: ArmScope) -> Self {
        Self {
            http,
            credential,
            scope,
        }
    }

    /// Returns the configured scope.
    #[must_use]
    pub const fn scope(&self) -> &ArmScope {
        &self.scope
    }
}

impl<H: HttpClient, C: TokenCredential> ArmClient<H, C> {
    /// Sends an authenticated request.
    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> Result<HttpResponse, ArmError> {
        let token = self.credential.token().await?;
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.secret())).map_err(|_| {
            ArmError::Credential("access token contains invalid header characters".to_string())
        })?;
        auth.set_sensitive(true);

        let mut request = HttpRequest::new(method, url)
            .with_header(AUTHORIZATION, auth)
            .with_header(ACCEPT, HeaderValue::from_static(JSON));
        if let Some(body) = body {
            request = request
                .with_header(CONTENT_TYPE, HeaderValue::from_static(JSON))
               .with_body(body);
        }

        tracing::debug!(method = %request.method, url = %request.url, "Sending control-plane request");
        let response = self.http.request(request).await?;
        tracing::debug!(status = %response.status, "Control-plane response received");
        Ok(response)
    }

    async fn get_resource<T: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        name: &str,
        expand: Option<&str>,
    ) -> Result<T, ArmError> {
        let mut url = self.scope.resource_url(kind, name, None)?;
        if let Some(expand) = expand {
            url.query_pairs_mut().append_pair("$expand", expand);
        }

        let response = self.send(Method::GET, url, None).await?;
        if !response.is_success() {
            return Err(error_from_response(&response));
        }
        decode(&response)
    }

    async fn put_resource<T>(
        &self,
        kind: ResourceKind,
        name: &str,
        resource: &T,
    ) -> Result<Operation<T>, ArmError>
    where
        T: Serialize + DeserializeOwned + Sync,
    {
        let url = self.scope.resource_url(kind, name, None)?;
        let body = serde_json::to_vec(resource)?;
        let response = self.send(Method::PUT, url.clone(), Some(body)).await?;
        start_operation(Method::PUT, url, &response)
    }

    async fn delete_resource(
        &self,
        kind: ResourceKind,
        name: &str,
    ) -> Result<Operation<NoContent>, ArmError> {
        let url = self.scope.resource_url(kind, name, None)?;
        let response = self.send(Method::DELETE, url.clone(), None).await?;
        start_operation(Method::DELETE, url, &response)
    }

    async fn post_action<B: Serialize + Sync>(
        &self,
        kind: ResourceKind,
        name: &str,
        action: &str,
        body: &B,
    ) -> Result<Operation<NoContent>, ArmError> {
        let url = self.scope.resource_url(kind, name, Some(action))?;
        let body = serde_json::to_vec(body)?;
        let response = self.send(Method::POST, url.clone(), Some(body)).await?;
        start_operation(Method::POST, url, &response)
    }

    async fn poll_async_operation(
        &self,
        target: &PollTarget,
        response: &HttpResponse,
    ) -> Result<PollStatus, ArmError> {
        if !response.is_success() {
            return Err(error_from_response(response));
        }

        let status: OperationStatusBody = decode(response)?;
        if status.status.eq_ignore_ascii_case("Succeeded") {
            return self.final_result(target).await.map(PollStatus::Succeeded);
        }
        if status.status.eq_ignore_ascii_case("Failed")
            || status.status.eq_ignore_ascii_case("Canceled")
        {
            let error = status.error.unwrap_or_default();
            return Err(ArmError::OperationFailed {
                status: status.status,
                code: error.code,
                message: error.message,
            });
        }

        Ok(PollStatus::InProgress {
            retry_after: response.retry_after(),
        })
    }

    async fn poll_location(
        &self,
        target: &PollTarget,
        response: &HttpResponse,
    ) -> Result<PollStatus, ArmError> {
        if response.status == StatusCode::ACCEPTED {
            return Ok(PollStatus::InProgress {
                retry_after: response.retry_after(),
            });
        }
        if !response.is_success() {
            return Err(error_from_response(response));
        }
        if response.has_empty_body() {
            return self.final_result(target).await.map(PollStatus::Succeeded);
        }
        decode(response).map(|value| PollStatus::Succeeded(Some(value)))
    }

    /// Reads the resource after a successful PUT/PATCH; other methods have no result.
    async fn final_result(&self, target: &PollTarget) -> Result<Option<Value>, ArmError> {
        if target.method != Method::PUT && target.method != Method::PATCH {
            return Ok(None);
        }

        let response = self
            .send(Method::GET, target.resource_url.clone(), None)
            .await?;
        if !response.is_success() {
            return Err(error_from_response(&response));
        }
        decode(&response).map(Some)
    }
}

impl<H: HttpClient, C: TokenCredential> OperationPoller for ArmClient<H, C> {
    async fn poll(&self, target: &PollTarget) -> Result<PollStatus, ArmError> {
        let response = self
            .send(Method::GET, target.status_url.clone(), None)
            .await?;

        match target.mode {
            PollMode::AsyncOperation => self.poll_async_operation(target, &response).await,
            PollMode::Location => self.poll_location(target, &response).await,
        }
    }
}

impl<H: HttpClient, C: TokenCredential> PublicIpAddresses for ArmClient<H, C> {
    async fn get_public_ip(&self, name: &str) -> Result<PublicIpAddress, ArmError> {
        self.get_resource(ResourceKind::PublicIpAddress, name, None)
            .await
    }

    async fn create_or_update_public_ip(
        &self,
        name: &str,
        public_ip: &PublicIpAddress,
    ) -> Result<Operation<PublicIpAddress>, ArmError> {
        self.put_resource(ResourceKind::PublicIpAddress, name, public_ip)
            .await
    }

    async fn delete_public_ip(&self, name: &str) -> Result<Operation<NoContent>, ArmError> {
        self.delete_resource(ResourceKind::PublicIpAddress, name)
            .await
    }
}

impl<H: HttpClient, C: TokenCredential> NetworkInterfaces for ArmClient<H, C> {
    async fn get_interface(&self, name: &str) -> Result<NetworkInterface, ArmError> {
        self.get_resource(ResourceKind::NetworkInterface, name, None)
            .await
    }

    async fn create_or_update_interface(
        &self,
        name: &str,
        interface: &NetworkInterface,
    ) -> Result<Operation<NetworkInterface>, ArmError> {
        self.put_resource(ResourceKind::NetworkInterface, name, interface)
            .await
    }

    async fn delete_interface(&self, name: &str) -> Result<Operation<NoContent>, ArmError> {
        self.delete_resource(ResourceKind::NetworkInterface, name)
            .await
    }
}

impl<H: HttpClient, C: TokenCredential> VirtualMachines for ArmClient<H, C> {
    async fn get_virtual_machine(&self, name: &str) -> Result<VirtualMachine, ArmError> {
        self.get_resource(ResourceKind::VirtualMachine, name, Some(VM_EXPAND))
            .await
    }
}

impl<H: HttpClient, C: TokenCredential> ScaleSets for ArmClient<H, C> {
    async fn get_scale_set(&self, name: &str) -> Result<VirtualMachineScaleSet, ArmError> {
        self.get_resource(ResourceKind::ScaleSet, name, None).await
    }

    async fn create_or_update_scale_set(
        &self,
        name: &str,
        scale_set: &VirtualMachineScaleSet,
    ) -> Result<Operation<VirtualMachineScaleSet>, ArmError> {
        self.put_resource(ResourceKind::ScaleSet, name, scale_set)
            .await
    }

    async fn update_scale_set_instances(
        &self,
        name: &str,
        instances: &InstanceIds,
    ) -> Result<Operation<NoContent>, ArmError> {
        self.post_action(ResourceKind::ScaleSet, name, MANUAL_UPGRADE, instances)
            .await
    }
}

/// Turns the response to a mutating request into an operation handle.
fn start_operation<T: DeserializeOwned>(
    method: Method,
    resource_url: Url,
    response: &HttpResponse,
) -> Result<Operation<T>, ArmError> {
    if !response.is_success() {
        return Err(error_from_response(response));
    }

    let retry_after = response.retry_after();

    if let Some(status_url) = response.header(ASYNC_OPERATION) {
        return Ok(Operation::pending(PollTarget {
            mode: PollMode::AsyncOperation,
            status_url: parse_url(status_url)?,
            resource_url,
            method,
            retry_after,
        }));
    }

    if response.status == StatusCode::ACCEPTED {
        let location = response.header(LOCATION.as_str()).ok_or_else(|| {
            ArmError::InvalidResponse(
                "202 Accepted without Azure-AsyncOperation or Location header".to_string(),
            )
        })?;
        return Ok(Operation::pending(PollTarget {
            mode: PollMode::Location,
            status_url: parse_url(location)?,
            resource_url,
            method,
            retry_after,
        }));
    }

    if response.has_empty_body() {
        return Ok(Operation::done(None));
    }
    decode(response).map(|resource| Operation::done(Some(resource)))
}

fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ArmError> {
    serde_json::from_slice(&response.body).map_err(ArmError::from)
}

fn parse_url(value: &str) -> Result<Url, ArmError> {
    Url::parse(value)
        .map_err(|e| ArmError::InvalidResponse(format!("invalid polling URL '{value}': {e}")))
}

/// Maps a non-success response to an error, keeping the control-plane code.
fn error_from_response(response: &HttpResponse) -> ArmError {
    let body = serde_json::from_slice::<CloudError>(&response.body)
        .ok()
        .and_then(|e| e.error)
        .unwrap_or_else(|| CloudErrorBody {
            code: response
                .status
                .canonical_reason()
                .unwrap_or("Unknown")
                .to_string(),
            message: response.body_text().unwrap_or_default().trim().to_string(),
        });

    if response.status == StatusCode::NOT_FOUND && !is_scope_not_found_code(&body.code) {
        return ArmError::NotFound {
            code: body.code,
            message: body.message,
        };
    }

    ArmError::Status {
        status: response.status,
        code: body.code,
        message: body.message,
    }
}
