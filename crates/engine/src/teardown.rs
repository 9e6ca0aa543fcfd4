use tracing::debug;

type Callback = Box<dyn FnOnce() + Send>;

#[derive(Default)]
pub struct Teardown {
    callbacks: Vec<(&'static str, Callback)>,
}

impl Teardown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &'static str, callback: impl FnOnce() + Send + 'static) {
        self.callbacks.push((name, Box::new(callback)));
    }

    // FIFO, each callback at most once. Draining makes a repeat call a no-op.
    pub fn run(&mut self) {
        for (name, callback) in self.callbacks.drain(..) {
            debug!(step = name, "teardown");
            callback();
        }
    }
}

impl Drop for Teardown {
    fn drop(&mut self) {
        self.run();
    }
}

#[cfg(test)]
mod tests {
    use super::Teardown;
    use std::sync::{Arc, Mutex};

    fn recorder() -> (Arc<Mutex<Vec<&'static str>>>, impl Fn(&'static str) -> Box<dyn FnOnce() + Send>)
    {
        let log = Arc::new(Mutex::new(Vec::new()));
        let for_closures = log.clone();
        let make = move |name: &'static str| -> Box<dyn FnOnce() + Send> {
            let log = for_closures.clone();
            Box::new(move || log.lock().unwrap().push(name))
        };
        (log, make)
    }

    #[test]
    fn runs_in_registration_order() {
        let (log, make) = recorder();
        let mut teardown = Teardown::new();
        teardown.register("first", make("first"));
        teardown.register("second", make("second"));

        teardown.run();
        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn second_run_is_a_no_op() {
        let (log, make) = recorder();
        let mut teardown = Teardown::new();
        teardown.register("only", make("only"));

        teardown.run();
        teardown.run();
        assert_eq!(*log.lock().unwrap(), vec!["only"]);
    }

    #[test]
    fn drop_runs_whatever_was_not_run() {
        let (log, make) = recorder();
        {
            let mut teardown = Teardown::new();
            teardown.register("late", make("late"));
        }
        assert_eq!(*log.lock().unwrap(), vec!["late"]);
    }
}
