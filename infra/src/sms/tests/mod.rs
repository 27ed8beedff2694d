mod failover_tests;
mod timeout_failover_tests;
