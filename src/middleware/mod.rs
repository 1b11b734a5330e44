/*
 * Responsibility
 * - middleware の公開インターフェース (re-export)
 * - auth: ID token 検証, http: request-id / trace / limit / timeout
 */
pub mod auth;
pub mod http;
