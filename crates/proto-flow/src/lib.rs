// Hand-maintained message types for the Flow-side protocol surfaces which the
// gateway touches: exposed-port configuration of a task shard, and the
// NetworkProxy stream spoken with a shard's primary reactor.

pub mod flow;
