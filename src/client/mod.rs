pub mod admin_ops;
