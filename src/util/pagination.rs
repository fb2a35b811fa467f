use serde::Serialize;

pub const POR_PAGINA_DEFECTO: u64 = 10;
pub const POR_PAGINA_MAXIMO: u64 = 100;

/// Resolved page window for a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Paginacion {
    pub total: u64,
    pub pagina: u64,
    pub por_pagina: u64,
    pub total_paginas: u64,
}

impl Paginacion {
    /// Clamps the requested page size to `[1, 100]` and the page into
    /// `[1, max(1, total_paginas)]`.
    pub fn new(total: u64, pagina: Option<u64>, por_pagina: Option<u64>) -> Self {
        let por_pagina = por_pagina
            .unwrap_or(POR_PAGINA_DEFECTO)
            .clamp(1, POR_PAGINA_MAXIMO);
        let total_paginas = total.div_ceil(por_pagina);
        let pagina = pagina.unwrap_or(1).clamp(1, total_paginas.max(1));
        Paginacion { total, pagina, por_pagina, total_paginas }
    }

    pub fn saltar(&self) -> u64 {
        (self.pagina - 1) * self.por_pagina
    }

    pub fn limite(&self) -> i64 {
        self.por_pagina as i64
    }
}
