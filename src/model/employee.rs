use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1000,
        "employee_code": "EMP-1000",
        "first_name": "John",
        "last_name": "Doe",
        "email": "john.doe@company.com",
        "department_id": 10,
        "role_id": 3,
        "annual_allowance": 20.0
    })
)]
pub struct Employee {
    #[schema(example = 1000)]
    pub id: u64,

    #[schema(example = "EMP-1000")]
    pub employee_code: String,

    #[schema(example = "John")]
    pub first_name: String,

    #[schema(example = "Doe")]
    pub last_name: String,

    #[schema(example = "john.doe@company.com")]
    pub email: String,

    #[schema(example = 10)]
    pub department_id: u64,

    #[schema(example = 3)]
    pub role_id: u8,

    /// Annual vacation allowance in days. The remaining balance is always
    /// derived as allowance minus the sum of accepted request quantities.
    #[schema(example = 20.0)]
    pub annual_allowance: f64,
}

impl Employee {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
