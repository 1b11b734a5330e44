/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - ID token の検証ロジックは middleware/services 側の責務
 * - 認可 (何を許可するか) はここでは扱わない
 */

use crate::services::auth::VerifiedIdentity;
use crate::services::auth::events::VerificationPath;

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - `identity` は呼び出し元 service account の email (token の `email` claim そのまま)
/// - `path` はどちらのヘッダで検証したか (Lenient の場合、署名は proxy 側でのみ検証済み)
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub identity: VerifiedIdentity,
    pub path: VerificationPath,
}

impl AuthCtx {
    pub fn new(identity: VerifiedIdentity, path: VerificationPath) -> Self {
        Self { identity, path }
    }

    pub fn email(&self) -> &str {
        self.identity.as_str()
    }

    pub fn signature_verified_here(&self) -> bool {
        matches!(self.path, VerificationPath::Strict)
    }
}
