/*
 * Responsibility
 * - Handler から見える「認可済みコンテキスト」の型
 * - permission guard が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - JWT の検証・permission の判定は middleware/services 側の責務
 * - リクエストごとに生成され、リクエスト終了とともに破棄される
 */
use std::collections::BTreeSet;

use crate::services::auth::claims::Claims;

/// 検証済み credential から取り出したコンテキスト
///
/// - `subject` は issuer が付与した主体 ID (`sub`、無い場合もある)
/// - `permissions` は guard を通過した時点の permission 集合
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthCtx {
    pub subject: Option<String>,
    pub permissions: BTreeSet<String>,
}

impl AuthCtx {
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            subject: claims.sub,
            permissions: claims.permissions.unwrap_or_default(),
        }
    }
}
