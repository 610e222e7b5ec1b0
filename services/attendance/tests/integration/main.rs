mod helpers;
mod http_test;
mod local_store_test;
mod remote_store_test;
mod scenario_test;
