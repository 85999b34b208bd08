use chrono::Utc;
use uuid::Uuid;

/// Replaces every run of whitespace with a single underscore.
pub fn sanitize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_whitespace = false;

    for ch in input.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                out.push('_');
            }
            in_whitespace = true;
        } else {
            out.push(ch);
            in_whitespace = false;
        }
    }

    out
}

/// Grouping key for the derived project view: customer number and sanitized
/// customer name. Collisions between customers are not detected.
pub fn project_id(customer_number: &str, customer_name: &str) -> String {
    format!("{}_{}", customer_number, sanitize(customer_name))
}

fn file_extension(file_name: &str) -> &str {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
        .unwrap_or("bin")
}

/// Derives the object-store key for an upload:
/// `uploads/{number}_{name}/{category}/{millis}-{uuid}.{ext}`.
///
/// The timestamp/uuid pair makes the key unique even when the same original
/// filename is uploaded twice with identical metadata.
pub fn derive_storage_key(
    customer_number: &str,
    customer_name: &str,
    category: &str,
    file_name: &str,
) -> String {
    let unique_name = format!(
        "{}-{}.{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4(),
        file_extension(file_name)
    );

    format!(
        "uploads/{}_{}/{}/{}",
        customer_number,
        sanitize(customer_name),
        sanitize(category),
        unique_name
    )
}

/// Public URL of a stored object.
pub fn public_url(base_url: &str, storage_key: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), storage_key)
}
