// Catalog endpoints
//
// Listing, detail and whole-instance scan. Each one posts the full
// credentials, unwraps the `{success, error?}` envelope and hands back the
// typed response.

use tracing::debug;

use crate::client::ProporterClient;
use crate::credentials::Credentials;
use crate::error::Error;
use crate::models::{
    Envelope, InstanceExportRequest, InstanceExportResponse, ListResourcesRequest,
    ResourceDetailRequest, ResourceDetailResponse, ResourceListResponse,
};

impl ProporterClient {
    /// List every object of one resource type.
    ///
    /// `POST /api/jamf/resources`
    pub async fn list_resources(
        &self,
        credentials: &Credentials,
        resource_type: &str,
    ) -> Result<ResourceListResponse, Error> {
        let body = ListResourcesRequest {
            credentials: credentials.body()?,
            resource_type,
        };
        debug!(resource_type, "listing resources");
        let resp: ResourceListResponse = self.post_json("api/jamf/resources", &body).await?;
        resp.into_result()
    }

    /// Fetch one object with its rendered HCL and direct dependencies.
    ///
    /// `POST /api/jamf/resource-detail`
    ///
    /// Dependencies come back in server order and are not re-sorted.
    pub async fn get_resource_detail(
        &self,
        credentials: &Credentials,
        resource_type: &str,
        resource_id: u64,
    ) -> Result<ResourceDetailResponse, Error> {
        let body = ResourceDetailRequest {
            credentials: credentials.body()?,
            resource_type,
            resource_id,
        };
        debug!(resource_type, resource_id, "fetching resource detail");
        let resp: ResourceDetailResponse =
            self.post_json("api/jamf/resource-detail", &body).await?;
        resp.into_result()
    }

    /// Inventory the whole instance.
    ///
    /// `POST /api/jamf/instance-export` with an empty `selected_types`,
    /// which the backend reads as "every supported type".
    pub async fn scan_instance(
        &self,
        credentials: &Credentials,
    ) -> Result<InstanceExportResponse, Error> {
        self.scan_types(credentials, &[]).await
    }

    /// Inventory only the given resource types.
    async fn scan_types(
        &self,
        credentials: &Credentials,
        selected_types: &[String],
    ) -> Result<InstanceExportResponse, Error> {
        let body = InstanceExportRequest {
            credentials: credentials.body()?,
            selected_types,
        };
        debug!(types = selected_types.len(), "scanning instance");
        let resp: InstanceExportResponse =
            self.post_json("api/jamf/instance-export", &body).await?;
        resp.into_result()
    }
}
