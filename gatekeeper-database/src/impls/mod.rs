pub mod role_keys;
