/// Utilitários para manipulação segura de strings UTF-8

/// Trunca uma string de forma segura, garantindo que o índice não corte no meio de um caractere UTF-8
///
/// # Argumentos
/// * `s` - String a ser truncada
/// * `max_bytes` - Número máximo de bytes a retornar
///
/// # Exemplo
/// ```
/// use ghl_integration_api::utils::string_utils::truncate_safe;
///
/// assert_eq!(truncate_safe("eyJhbGciOiJIUzI1NiJ9", 6), "eyJhbG");
/// ```
pub fn truncate_safe(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }

    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }

    &s[..end]
}

/// Trunca uma string e adiciona um sufixo (como "...") de forma segura
pub fn truncate_with_suffix(s: &str, max_bytes: usize, suffix: &str) -> String {
    let truncated = truncate_safe(s, max_bytes);
    if truncated.len() < s.len() {
        format!("{}{}", truncated, suffix)
    } else {
        truncated.to_string()
    }
}

/// Versão mascarada de uma credencial para log (`abcd1234...`)
pub fn mask_credential(credential: &str) -> String {
    truncate_with_suffix(credential, 8, "...")
}
