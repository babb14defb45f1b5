// Key masking for logs
pub fn mask_key(key: &str) -> String {
    if key.len() <= 8 || !key.is_ascii() {
        return "****".to_string();
    }
    let (start, end) = (&key[..4], &key[key.len() - 4..]);
    format!("{}****{}", start, end)
}
