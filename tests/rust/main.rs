mod http_api;
mod support;
