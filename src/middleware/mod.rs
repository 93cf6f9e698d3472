/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth::guard (route 単位), http / cors / security_headers (Router 全体)
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
