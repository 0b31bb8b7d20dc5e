mod backend_client_test;
mod helpers;
mod shell_test;
