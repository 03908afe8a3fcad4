pub(crate) mod admin_service;
pub(crate) mod auth_service;
pub(crate) mod blog_service;

#[cfg(test)]
pub(crate) mod test_support;
