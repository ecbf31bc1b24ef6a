use log::debug;

macro_rules! passes {
    ([ $( $name:ident => $class:ident, )* ]) => {
        $( mod $name; )*
        $( pub use self::$name::*; )*

        #[derive(Debug)]
        pub struct DenoiserPasses {
            $( pub $name: $class, )*
        }

        impl DenoiserPasses {
            pub fn new() -> Self {
                debug!("Initializing denoiser passes");

                Self {
                    $( $name: $class::new(), )*
                }
            }
        }
    };
}

passes!([
    postprocess => PostprocessPass,
    preprocess => PreprocessPass,
    regression => RegressionPass,
]);
