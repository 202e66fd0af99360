// Environment variable utils

use std::env;

/// Gets boolean env var
///
/// # Arguments
///
/// * `var_name` - The name of the environment variable
/// * `default_val` - The default value
///
/// # Return value
///
/// Returns true for 'YES' or 'TRUE', false for 'NO' or 'FALSE' (case insensitive).
/// Any other value, or a missing variable, yields default_val
pub fn get_env_bool(var_name: &str, default_val: bool) -> bool {
    match env::var(var_name) {
        Ok(var_str) => match var_str.to_uppercase().as_str() {
            "YES" | "TRUE" => true,
            "NO" | "FALSE" => false,
            _ => default_val,
        },
        Err(_) => default_val,
    }
}

/// Gets string env var, or default_val if not present
pub fn get_env_string(var_name: &str, default_val: &str) -> String {
    env::var(var_name).unwrap_or_else(|_| default_val.to_string())
}

/// Gets u32 env var
///
/// Returns default_val if the variable is missing or is not a valid u32
pub fn get_env_u32(var_name: &str, default_val: u32) -> u32 {
    match env::var(var_name) {
        Ok(var_str) => var_str.trim().parse().unwrap_or(default_val),
        Err(_) => default_val,
    }
}

/// Gets u64 env var
///
/// Returns default_val if the variable is missing or is not a valid u64
pub fn get_env_u64(var_name: &str, default_val: u64) -> u64 {
    match env::var(var_name) {
        Ok(var_str) => var_str.trim().parse().unwrap_or(default_val),
        Err(_) => default_val,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_parsing() {
        env::set_var("DASHBOARD_TEST_BOOL_YES", "yes");
        env::set_var("DASHBOARD_TEST_BOOL_FALSE", "False");
        env::set_var("DASHBOARD_TEST_BOOL_BAD", "maybe");
        env::set_var("DASHBOARD_TEST_NUM", " 8002 ");
        env::set_var("DASHBOARD_TEST_NUM_BAD", "-1");

        assert!(get_env_bool("DASHBOARD_TEST_BOOL_YES", false));
        assert!(!get_env_bool("DASHBOARD_TEST_BOOL_FALSE", true));
        assert!(get_env_bool("DASHBOARD_TEST_BOOL_BAD", true));
        assert!(!get_env_bool("DASHBOARD_TEST_BOOL_MISSING", false));

        assert_eq!(get_env_u32("DASHBOARD_TEST_NUM", 1), 8002);
        assert_eq!(get_env_u32("DASHBOARD_TEST_NUM_BAD", 1), 1);
        assert_eq!(get_env_u64("DASHBOARD_TEST_NUM", 1), 8002);
        assert_eq!(get_env_u64("DASHBOARD_TEST_NUM_MISSING", 3000), 3000);

        assert_eq!(get_env_string("DASHBOARD_TEST_STR_MISSING", "logs/app.log"), "logs/app.log");
    }
}
