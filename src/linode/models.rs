use crate::common::RecordKind;

/// Envelope of every Linode list endpoint.
#[derive(serde::Deserialize)]
pub(super) struct Page<T> {
    pub data: Vec<T>,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "first_page")]
    pub pages: u32,
    #[serde(default)]
    pub results: u32,
}

fn first_page() -> u32 {
    1
}

#[derive(serde::Serialize)]
pub(super) struct UpdateTarget<'a> {
    pub target: &'a str,
}

#[derive(serde::Serialize)]
pub(super) struct CreateRecord<'a> {
    pub name: &'a str,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub target: &'a str,
}
