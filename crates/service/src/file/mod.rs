pub mod kv_file_store;
