use crate::Float;

pub trait Kernel {
    // Filter
    fn kernel(&self) -> &Vec<Float>;
    // Size at which the filter is traversed
    fn step(&self) -> usize;
    // Half of the width of the kernel save the center element, in samples of the image
    fn radius(&self) -> usize {
        (self.kernel().len()-1)/2*self.step()
    }

    fn normalizing_constant(&self) -> Float;
}
