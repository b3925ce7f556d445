//! Macros to reduce boilerplate in layer implementations

/// Implements `Evented` and the accessor half of `Layer` for a layer type
/// that stores its shared state in a `LayerBase` field.
///
/// The invoking type still implements `Layer::set_opacity` itself:
///
/// ```ignore
/// impl_layer_base!(MyLayer, base);
///
/// impl Layer for MyLayer {
///     layer_accessors!(base);
///
///     fn set_opacity(&mut self, renderer: &mut dyn Renderer, opacity: f64) -> Result<()> {
///         /* ... */
///     }
/// }
/// ```
#[macro_export]
macro_rules! impl_layer_base {
    ($layer_type:ty, $base_field:ident) => {
        impl $crate::input::emitter::Evented for $layer_type {
            fn listeners(&self) -> &$crate::input::emitter::EventListeners {
                $crate::input::emitter::Evented::listeners(&self.$base_field)
            }

            fn listeners_mut(&mut self) -> &mut $crate::input::emitter::EventListeners {
                $crate::input::emitter::Evented::listeners_mut(&mut self.$base_field)
            }
        }
    };
}

/// Generates `base`, `base_mut`, `as_any` and `as_any_mut` inside an `impl Layer` block
#[macro_export]
macro_rules! layer_accessors {
    ($base_field:ident) => {
        fn base(&self) -> &$crate::layers::base::LayerBase {
            &self.$base_field
        }

        fn base_mut(&mut self) -> &mut $crate::layers::base::LayerBase {
            &mut self.$base_field
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    };
}
