/// Escapes regex metacharacters so user input matches literally.
pub fn escapar_regex(texto: &str) -> String {
    let mut salida = String::with_capacity(texto.len());
    for c in texto.chars() {
        if matches!(c, '.' | '*' | '+' | '?' | '^' | '$' | '{' | '}' | '(' | ')' | '|' | '[' | ']' | '\\') {
            salida.push('\\');
        }
        salida.push(c);
    }
    salida
}

/// Trims the value; blank strings become `None`.
pub fn no_vacio(valor: Option<&str>) -> Option<&str> {
    valor.map(str::trim).filter(|v| !v.is_empty())
}

/// Splits `a, b,,c` into `["a", "b", "c"]`.
pub fn lista_separada_por_comas(valor: &str) -> Vec<String> {
    valor
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}
