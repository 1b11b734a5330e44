use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct RelayQuery {
    // Send the token in `X-Serverless-Authorization` instead of `Authorization`.
    #[serde(default)]
    pub use_x_serverless_authorization: bool,
}
