/*
 * Responsibility
 * - GET /credentials の response DTO
 */
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CredentialsResponse {
    pub message: String,
    pub email: String,
    // "strict": この service で署名まで検証 / "lenient": proxy が署名を検証済み
    pub verification: &'static str,
    pub signature_verified_here: bool,
}
