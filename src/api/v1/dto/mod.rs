/*
 * Responsibility
 * - request/response DTO の公開
 */
pub mod drinks;
