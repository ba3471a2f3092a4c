use super::{segment, with_query};
use crate::client::ApiClient;
use crate::error::ClientResult;
use crate::models::{Device, DeviceCreateDto, DeviceStatus, PagedList};

pub struct DevicesService<'a> {
    api: &'a ApiClient,
}

impl<'a> DevicesService<'a> {
    pub const BASE: &'static str = "/devices";

    pub fn new(api: &'a ApiClient) -> Self { Self { api } }

    pub async fn create_device(&self, device: &DeviceCreateDto) -> ClientResult<Device> {
        self.api.post(Self::BASE, device).await
    }

    pub async fn get_devices_page(&self, group_id: &str, page: u32, size: u32) -> ClientResult<PagedList<Device>> {
        let page = page.to_string();
        let size = size.to_string();
        self.api.get(&with_query(Self::BASE, &[("page", page.as_str()), ("size", size.as_str()), ("groupId", group_id)])).await
    }

    /// Attach a device to a group and switch it on or off.
    pub async fn update_device_status(&self, device_id: &str, status: &DeviceStatus) -> ClientResult<Device> {
        let path = format!("{}/{}/status", Self::BASE, segment(device_id));
        self.api.patch(&path, status).await
    }
}
