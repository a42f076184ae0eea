//! Member model matching the backend `Member` interface.

use serde::{Deserialize, Serialize};

/// A registered member as returned by the remote backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: u64,
    pub status: String,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub membership_type: String,
    /// Label/value pairs of the form schema active at submission time
    #[serde(default)]
    pub custom_fields: Vec<(String, String)>,
    /// Nanoseconds since the Unix epoch
    pub registration_date: i64,
}

/// Arguments of the backend `registerMember` call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterMemberRequest {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub membership_type: String,
    pub custom_fields: Vec<(String, String)>,
}

/// The fixed set of membership tiers offered on the registration form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MembershipType {
    #[serde(rename = "biasa")]
    Ordinary,
    #[serde(rename = "bersekutu")]
    Associate,
    #[serde(rename = "kehormat")]
    Honorary,
    #[serde(rename = "seumur-hidup")]
    Lifetime,
}

impl MembershipType {
    pub const ALL: [MembershipType; 4] = [
        MembershipType::Ordinary,
        MembershipType::Associate,
        MembershipType::Honorary,
        MembershipType::Lifetime,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            MembershipType::Ordinary => "biasa",
            MembershipType::Associate => "bersekutu",
            MembershipType::Honorary => "kehormat",
            MembershipType::Lifetime => "seumur-hidup",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MembershipType::Ordinary => "Ahli Biasa",
            MembershipType::Associate => "Ahli Bersekutu",
            MembershipType::Honorary => "Ahli Kehormat",
            MembershipType::Lifetime => "Ahli Seumur Hidup",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    /// Display label for a stored code, falling back to the code itself.
    pub fn label_for(code: &str) -> String {
        Self::from_code(code)
            .map(|t| t.label().to_string())
            .unwrap_or_else(|| code.to_string())
    }
}

/// Status assigned by the backend when a member registers.
pub const STATUS_ACTIVE: &str = "active";

/// Display label for a member status code.
pub fn status_label(status: &str) -> String {
    match status {
        "active" => "Aktif".to_string(),
        "pending" => "Menunggu".to_string(),
        "inactive" => "Tidak Aktif".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_labels() {
        assert_eq!(MembershipType::label_for("kehormat"), "Ahli Kehormat");
        assert_eq!(MembershipType::label_for("pelajar"), "pelajar");
        assert_eq!(
            MembershipType::from_code("seumur-hidup"),
            Some(MembershipType::Lifetime)
        );
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(status_label("active"), "Aktif");
        assert_eq!(status_label("pending"), "Menunggu");
        assert_eq!(status_label("suspended"), "suspended");
    }

    #[test]
    fn test_custom_fields_serialize_as_pairs() {
        let request = RegisterMemberRequest {
            full_name: "Ahmad".into(),
            email: "a@b.com".into(),
            phone_number: "012-3456789".into(),
            membership_type: "biasa".into(),
            custom_fields: vec![("Alamat".into(), "Ipoh".into())],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["customFields"], serde_json::json!([["Alamat", "Ipoh"]]));
        assert_eq!(json["phoneNumber"], "012-3456789");
    }
}
