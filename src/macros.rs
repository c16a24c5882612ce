macro_rules! linear_ids {
    ($ids:ident, $id:ident) => {
        pub struct $ids {
            next: std::cell::Cell<u64>,
        }

        impl Default for $ids {
            fn default() -> Self {
                Self {
                    next: std::cell::Cell::new(1),
                }
            }
        }

        impl $ids {
            pub fn next(&self) -> $id {
                let id = self.next.get();
                self.next.set(id + 1);
                $id(id)
            }
        }

        #[derive(Debug, Copy, Clone, Hash, Ord, PartialOrd, Eq, PartialEq)]
        pub struct $id(u64);

        impl $id {
            pub fn raw(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $id {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }
    };
}
