use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::MedicineForm;

#[derive(Debug, Clone, Serialize)]
pub struct Medicine {
    pub id: i64,
    pub name: String,
    pub generic_name: Option<String>,
    pub manufacturer: Option<String>,
    pub form: MedicineForm,
    pub strength: Option<String>,
    pub unit: Option<String>,
    pub requires_prescription: bool,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMedicine {
    pub name: String,
    pub generic_name: Option<String>,
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub form: MedicineForm,
    pub strength: Option<String>,
    pub unit: Option<String>,
    #[serde(default = "default_requires_prescription")]
    pub requires_prescription: bool,
    pub description: Option<String>,
}

fn default_requires_prescription() -> bool {
    true
}
